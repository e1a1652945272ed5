//! A movable character: state, capsule and observers wired together.

use glam::{Quat, Vec3};
use strider_common::{GravityProvider, Transform, yaw_from_direction};
use strider_input::ActionPacket;
use strider_physics::{CapsuleController, PhysicsBackend, PhysicsError, SharedBackend};

use crate::config::{ConfigError, MovementConfig};
use crate::ground::GroundHooks;
use crate::integrator::{TickReport, integrate};
use crate::smoother::smooth_input;
use crate::state::{CrouchStatus, MoveState, MoveStatus};

#[derive(Debug, thiserror::Error)]
pub enum SpawnError {
    #[error("invalid movement config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// One simulated character.
///
/// Owns its movement state and its capsule controller; dropping the
/// character releases the controller handle.
#[derive(Debug)]
pub struct Character<B: PhysicsBackend> {
    state: MoveState,
    controller: CapsuleController<B>,
    hooks: GroundHooks,
    config: MovementConfig,
}

impl<B: PhysicsBackend> Character<B> {
    /// Create the capsule at `position` and settle it onto whatever is beneath.
    ///
    /// Fails if `config` does not validate or the backend refuses the controller.
    pub fn spawn(
        backend: SharedBackend<B>,
        config: MovementConfig,
        position: Vec3,
    ) -> Result<Self, SpawnError> {
        config.validate()?;
        let desc = config.capsule.descriptor(position);
        let controller = CapsuleController::new(backend, desc)?;
        let state = MoveState::new(config.control_mode, config.walk_speed, config.jump_velocity);
        let mut character = Self {
            state,
            controller,
            hooks: GroundHooks::new(),
            config,
        };
        character.settle()?;
        tracing::debug!(?position, on_ground = character.is_on_ground(), "character spawned");
        Ok(character)
    }

    /// Probe downward by the contact offset so the first tick knows the ground state.
    ///
    /// Without ground in reach the capsule goes back to where it was placed.
    fn settle(&mut self) -> Result<(), PhysicsError> {
        let placed = self.controller.position();
        let probe = Vec3::new(0.0, -self.config.capsule.contact_offset, 0.0);
        if !self.controller.move_by(probe, 0.0).collided_below() {
            self.controller.set_position(placed)?;
        }
        Ok(())
    }

    /// Run one tick: smooth `packet`, then integrate under the world's gravity.
    pub fn think(
        &mut self,
        packet: &ActionPacket,
        gravity: &dyn GravityProvider,
        dt: f32,
    ) -> TickReport {
        let on_ground = self.is_on_ground();
        smooth_input(&mut self.state, packet, on_ground, &self.config, dt);
        integrate(
            &mut self.state,
            &mut self.controller,
            &mut self.hooks,
            &self.config,
            gravity.gravity(),
            dt,
        )
    }

    pub fn is_on_ground(&self) -> bool {
        self.controller.last_flags().collided_below()
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity()
    }

    pub fn move_status(&self) -> MoveStatus {
        self.state.move_status()
    }

    pub fn crouch_status(&self) -> CrouchStatus {
        self.state.crouch_status()
    }

    pub fn position(&self) -> Vec3 {
        self.controller.position()
    }

    /// Yaw about +Y matching the facing direction.
    pub fn yaw(&self) -> f32 {
        yaw_from_direction(self.state.facing()).unwrap_or(0.0)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw())
    }

    /// Render transform after the last tick.
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position(),
            rotation: self.rotation(),
            ..Transform::default()
        }
    }

    pub fn state(&self) -> &MoveState {
        &self.state
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn controller(&self) -> &CapsuleController<B> {
        &self.controller
    }

    pub fn set_heading(&mut self, heading: Vec3) {
        self.state.set_heading(heading);
    }

    pub fn on_hit_ground(&mut self, callback: impl FnMut(Vec3) + 'static) {
        self.hooks.on_hit_ground(callback);
    }

    pub fn on_leave_ground(&mut self, callback: impl FnMut(Vec3) + 'static) {
        self.hooks.on_leave_ground(callback);
    }

    /// Move the capsule directly, dropping all motion and the previous ground state.
    pub fn teleport(&mut self, position: Vec3) -> Result<(), PhysicsError> {
        self.controller.set_position(position)?;
        self.controller.reset_flags();
        self.state.reset_motion();
        self.settle()?;
        tracing::debug!(?position, on_ground = self.is_on_ground(), "character teleported");
        Ok(())
    }
}
