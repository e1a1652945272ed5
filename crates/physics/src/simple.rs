//! Analytic backend over [`StaticGeometry`].
//!
//! Boxes are treated as solid columns and the capsule as its vertical axis,
//! which keeps every query closed-form and deterministic. Good enough for
//! headless runs and tests; use `RapierWorld` for real level geometry.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::backend::{ControllerDesc, ControllerHandle, GroundHit, PhysicsBackend, PhysicsError};
use crate::flags::CollisionFlags;
use crate::geometry::StaticGeometry;

#[derive(Debug, Clone, Copy)]
struct SimpleCapsule {
    position: Vec3,
    half_extent: f32,
    step_offset: f32,
    contact_offset: f32,
}

/// Deterministic kinematic world of floors and box columns.
#[derive(Debug, Default)]
pub struct SimpleWorld {
    geometry: StaticGeometry,
    controllers: BTreeMap<ControllerHandle, SimpleCapsule>,
    next_handle: u32,
    capacity: Option<usize>,
}

impl SimpleWorld {
    pub fn new(geometry: StaticGeometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    /// Cap the number of live controllers; creation beyond it fails.
    pub fn with_capacity_limit(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn geometry(&self) -> &StaticGeometry {
        &self.geometry
    }

    /// Highest walkable surface under `(x, z)` that is not above `limit_y`.
    fn surface_below(&self, x: f32, z: f32, limit_y: f32) -> Option<f32> {
        let floor = self.geometry.floor.filter(|h| *h <= limit_y);
        self.geometry
            .boxes
            .iter()
            .filter(|b| b.covers(x, z) && b.top() <= limit_y)
            .map(|b| b.top())
            .chain(floor)
            .reduce(f32::max)
    }

    /// Whether a box column at `(x, z)` overlaps the vertical span `[low, high]`.
    fn blocked_at(&self, x: f32, z: f32, low: f32, high: f32) -> bool {
        self.geometry.boxes.iter().any(|b| {
            let bottom = b.center.y - b.half_extents.y;
            b.covers(x, z) && b.top() > low && bottom < high
        })
    }

    /// Lowest box bottom at `(x, z)` between `from` and `to`, if any.
    fn ceiling_between(&self, x: f32, z: f32, from: f32, to: f32) -> Option<f32> {
        self.geometry
            .boxes
            .iter()
            .filter(|b| b.covers(x, z))
            .map(|b| b.center.y - b.half_extents.y)
            .filter(|bottom| *bottom >= from && *bottom < to)
            .reduce(f32::min)
    }
}

impl PhysicsBackend for SimpleWorld {
    fn create_controller(
        &mut self,
        desc: &ControllerDesc,
    ) -> Result<ControllerHandle, PhysicsError> {
        if let Some(cap) = self.capacity {
            if self.controllers.len() >= cap {
                return Err(PhysicsError::ControllerCreation(format!(
                    "controller limit of {cap} reached"
                )));
            }
        }
        let handle = ControllerHandle(self.next_handle);
        self.next_handle += 1;
        self.controllers.insert(
            handle,
            SimpleCapsule {
                position: desc.position,
                half_extent: desc.half_extent(),
                step_offset: desc.step_offset,
                contact_offset: desc.contact_offset,
            },
        );
        Ok(handle)
    }

    fn move_controller(
        &mut self,
        handle: ControllerHandle,
        displacement: Vec3,
        min_distance: f32,
        _dt: f32,
    ) -> CollisionFlags {
        let Some(capsule) = self.controllers.get(&handle).copied() else {
            tracing::warn!(?handle, "move on unknown controller");
            return CollisionFlags::EMPTY;
        };
        let displacement =
            if !displacement.is_finite() || displacement.length() < min_distance {
                Vec3::ZERO
            } else {
                displacement
            };

        let mut flags = CollisionFlags::EMPTY;
        let start = capsule.position;
        let mut pos = start;
        let start_feet = start.y - capsule.half_extent;
        let climb_limit = start_feet + capsule.step_offset;

        // Horizontal sweep: blocked by any column taller than the step offset.
        if displacement.x != 0.0 || displacement.z != 0.0 {
            let tx = start.x + displacement.x;
            let tz = start.z + displacement.z;
            let head = start.y + capsule.half_extent;
            if self.blocked_at(tx, tz, climb_limit, head) {
                flags |= CollisionFlags::SIDES;
            } else {
                pos.x = tx;
                pos.z = tz;
            }
        }

        pos.y += displacement.y;

        if displacement.y > 0.0 {
            let old_head = start.y + capsule.half_extent;
            let new_head = pos.y + capsule.half_extent;
            if let Some(bottom) = self.ceiling_between(pos.x, pos.z, old_head, new_head) {
                pos.y = bottom - capsule.half_extent;
                flags |= CollisionFlags::ABOVE;
            }
        }

        let feet = pos.y - capsule.half_extent;
        if let Some(ground) = self.surface_below(pos.x, pos.z, climb_limit.max(feet)) {
            if feet <= ground + capsule.contact_offset {
                pos.y = ground + capsule.half_extent;
                flags |= CollisionFlags::BELOW;
            }
        }

        if let Some(c) = self.controllers.get_mut(&handle) {
            c.position = pos;
        }
        flags
    }

    fn ground_query(&self, origin: Vec3, max_distance: f32) -> Option<GroundHit> {
        let top = self.surface_below(origin.x, origin.z, origin.y)?;
        (origin.y - top <= max_distance).then(|| GroundHit {
            point: Vec3::new(origin.x, top, origin.z),
            normal: Vec3::Y,
        })
    }

    fn position(&self, handle: ControllerHandle) -> Option<Vec3> {
        self.controllers.get(&handle).map(|c| c.position)
    }

    fn set_position(
        &mut self,
        handle: ControllerHandle,
        position: Vec3,
    ) -> Result<(), PhysicsError> {
        let c = self
            .controllers
            .get_mut(&handle)
            .ok_or(PhysicsError::UnknownHandle(handle))?;
        c.position = position;
        Ok(())
    }

    fn release_controller(&mut self, handle: ControllerHandle) {
        self.controllers.remove(&handle);
    }

    fn controller_count(&self) -> usize {
        self.controllers.len()
    }
}
