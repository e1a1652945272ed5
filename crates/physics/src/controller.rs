//! Single-owner capsule controller bound to a shared backend.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;

use crate::backend::{ControllerDesc, ControllerHandle, GroundHit, PhysicsBackend, PhysicsError};
use crate::flags::CollisionFlags;

/// A backend shared by every controller on the simulation thread.
pub type SharedBackend<B> = Rc<RefCell<B>>;

/// Wrap a backend so controllers can share it.
pub fn shared<B: PhysicsBackend>(backend: B) -> SharedBackend<B> {
    Rc::new(RefCell::new(backend))
}

/// One character's capsule inside the physics backend.
///
/// Owns its backend handle exclusively and releases it on drop. Keeps the
/// flags of the most recent move so the caller can detect ground edges.
pub struct CapsuleController<B: PhysicsBackend> {
    backend: SharedBackend<B>,
    handle: ControllerHandle,
    desc: ControllerDesc,
    position: Vec3,
    last_flags: CollisionFlags,
}

impl<B: PhysicsBackend> CapsuleController<B> {
    /// Validate `desc` and create the backend controller.
    ///
    /// Failure is fatal for the character being spawned.
    pub fn new(backend: SharedBackend<B>, desc: ControllerDesc) -> Result<Self, PhysicsError> {
        desc.validate()?;
        let handle = backend.borrow_mut().create_controller(&desc)?;
        tracing::debug!(?handle, position = ?desc.position, "created capsule controller");
        Ok(Self {
            backend,
            handle,
            desc,
            position: desc.position,
            last_flags: CollisionFlags::EMPTY,
        })
    }

    pub fn handle(&self) -> ControllerHandle {
        self.handle
    }

    pub fn desc(&self) -> &ControllerDesc {
        &self.desc
    }

    /// Sweep the capsule by `displacement` and remember the resulting flags.
    pub fn move_by(&mut self, displacement: Vec3, dt: f32) -> CollisionFlags {
        let flags = {
            let mut backend = self.backend.borrow_mut();
            let flags = backend.move_controller(
                self.handle,
                displacement,
                self.desc.min_move_distance,
                dt,
            );
            if let Some(p) = backend.position(self.handle) {
                self.position = p;
            }
            flags
        };
        self.last_flags = flags;
        flags
    }

    /// Probe for walkable ground below a capsule centered at `position`.
    ///
    /// Only surfaces within one step of the capsule bottom count; anything
    /// higher is an obstacle the capsule cannot climb and reads as a miss.
    pub fn ground_query(&self, position: Vec3) -> Option<GroundHit> {
        let feet = position.y - self.offset_from_ground();
        let reach = self.offset_from_ground() + self.desc.step_offset;
        self.backend
            .borrow()
            .ground_query(position, reach)
            .filter(|hit| hit.point.y <= feet + self.desc.step_offset)
    }

    /// Height of the capsule center above the surface it stands on.
    pub fn offset_from_ground(&self) -> f32 {
        self.desc.half_extent()
    }

    /// Position cached after the last move or teleport.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleport the capsule.
    pub fn set_position(&mut self, position: Vec3) -> Result<(), PhysicsError> {
        self.backend
            .borrow_mut()
            .set_position(self.handle, position)?;
        self.position = position;
        Ok(())
    }

    /// Flags returned by the most recent [`move_by`](Self::move_by).
    pub fn last_flags(&self) -> CollisionFlags {
        self.last_flags
    }

    /// Forget the previous flags, e.g. after a teleport.
    pub fn reset_flags(&mut self) {
        self.last_flags = CollisionFlags::EMPTY;
    }
}

impl<B: PhysicsBackend> Drop for CapsuleController<B> {
    fn drop(&mut self) {
        match self.backend.try_borrow_mut() {
            Ok(mut backend) => {
                backend.release_controller(self.handle);
                tracing::debug!(handle = ?self.handle, "released capsule controller");
            }
            Err(_) => tracing::warn!(
                handle = ?self.handle,
                "backend busy while dropping controller; handle leaked"
            ),
        }
    }
}

impl<B: PhysicsBackend> std::fmt::Debug for CapsuleController<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapsuleController")
            .field("handle", &self.handle)
            .field("position", &self.position)
            .field("last_flags", &self.last_flags)
            .finish()
    }
}
