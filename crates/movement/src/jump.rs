//! Jump sub-state: launch, airborne hook, landing.
//!
//! Never touches the physics backend; it only edits the velocity it is handed.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use strider_common::horizontal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpPhase {
    #[default]
    Grounded,
    Rising,
    Airborne,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpState {
    jump_velocity: f32,
    base_velocity: Vec3,
    jumping: bool,
    in_air: bool,
    phase: JumpPhase,
}

impl JumpState {
    pub fn new(jump_velocity: f32) -> Self {
        Self {
            jump_velocity,
            base_velocity: Vec3::ZERO,
            jumping: false,
            in_air: false,
            phase: JumpPhase::Grounded,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.jumping
    }

    pub fn in_air(&self) -> bool {
        self.in_air
    }

    pub fn phase(&self) -> JumpPhase {
        self.phase
    }

    /// Horizontal momentum recorded at launch.
    pub fn base_velocity(&self) -> Vec3 {
        self.base_velocity
    }

    /// Launch: drop vertical speed, then add the jump velocity and the
    /// horizontal part of `directional`, which is kept as base velocity.
    pub fn begin(&mut self, velocity: &mut Vec3, directional: Vec3, _dt: f32) {
        debug_assert!(!self.jumping, "begin while already jumping");
        velocity.y = 0.0;
        self.base_velocity = horizontal(directional);
        *velocity += Vec3::Y * self.jump_velocity + self.base_velocity;
        self.jumping = true;
        self.in_air = true;
        self.phase = JumpPhase::Rising;
        tracing::debug!(velocity = ?*velocity, "jump started");
    }

    /// Per-tick airborne hook. Leaves velocity alone; only tracks the apex.
    pub fn generate(&mut self, velocity: &mut Vec3, _dt: f32) {
        if self.phase == JumpPhase::Rising && velocity.y <= 0.0 {
            self.phase = JumpPhase::Airborne;
        }
    }

    /// Remove the launch momentum and finish the jump.
    pub fn landed(&mut self, velocity: &mut Vec3) {
        *velocity -= self.base_velocity;
        self.base_velocity = Vec3::ZERO;
        self.in_air = false;
        self.end();
    }

    pub fn end(&mut self) {
        self.jumping = false;
        self.phase = JumpPhase::Grounded;
    }

    pub(crate) fn reset(&mut self) {
        self.base_velocity = Vec3::ZERO;
        self.in_air = false;
        self.end();
    }
}
