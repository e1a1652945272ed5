//! Per-tick movement integration.
//!
//! The order of the steps below is load-bearing: gravity and the grounded
//! bias are applied every tick, even while standing, so the backend keeps
//! reporting ground contact without flicker.

use glam::Vec3;
use strider_common::{horizontal, rotate_about_up};
use strider_input::ControlMode;
use strider_physics::{CapsuleController, CollisionFlags, PhysicsBackend};

use crate::config::MovementConfig;
use crate::ground::{GroundHooks, GroundTransition, detect_transition};
use crate::state::MoveState;

/// What one integration step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Displacement submitted to the controller.
    pub requested: Vec3,
    /// Displacement the controller actually realized.
    pub displacement: Vec3,
    pub flags: CollisionFlags,
    pub transition: Option<GroundTransition>,
    pub on_ground: bool,
}

/// Run one integration step for a character whose input was just smoothed.
pub fn integrate<B: PhysicsBackend>(
    state: &mut MoveState,
    controller: &mut CapsuleController<B>,
    hooks: &mut GroundHooks,
    config: &MovementConfig,
    gravity: Vec3,
    dt: f32,
) -> TickReport {
    let dt = if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        tracing::warn!(dt, "non-finite or negative dt clamped to zero");
        0.0
    };
    let previous = controller.last_flags();
    let was_grounded = previous.collided_below();
    let start = controller.position();

    state.velocity += gravity * dt;

    let forward = horizontal(state.heading).try_normalize().unwrap_or(Vec3::NEG_Z);
    let right = forward.cross(Vec3::Y);

    let (directional, magnitude) = directional_impulse(state, forward, right);
    state.directional = directional;
    if let Some(facing) = horizontal(directional).try_normalize() {
        state.facing = facing;
    }

    if state.jump.is_jumping() {
        state.jump.generate(&mut state.velocity, dt);
    } else if state.jump_impulse {
        state.jump.begin(&mut state.velocity, directional, dt);
        state.jump_impulse = false;
    }

    // Sticky terrain: follow the ground under the next position.
    let mut adherence = Vec3::ZERO;
    if was_grounded && !state.jump.is_jumping() {
        adherence = directional;
        if dt > 0.0 {
            if let Some(hit) = controller.ground_query(start + directional * dt) {
                let target = hit.point.y + controller.offset_from_ground();
                let mut lift = (target - start.y) / dt;
                if magnitude < 1.0 {
                    lift *= magnitude;
                }
                adherence.y = lift;
            }
        }
        adherence.y -= config.extra_gravity;
        state.velocity += adherence;
    }

    let requested = state.velocity * dt;
    let flags = controller.move_by(requested, dt);
    let position = controller.position();

    // Ground friction: planar speed does not carry over while grounded.
    if was_grounded {
        state.velocity -= adherence;
    }

    let transition = detect_transition(previous, flags);
    match transition {
        Some(GroundTransition::HitGround) => {
            if state.jump.is_jumping() {
                state.jump.landed(&mut state.velocity);
            }
            state.velocity = Vec3::ZERO;
            tracing::debug!(?position, "hit ground");
            hooks.notify(GroundTransition::HitGround, position);
        }
        Some(GroundTransition::LeftGround) => {
            tracing::debug!(?position, velocity = ?state.velocity, "left ground");
            hooks.notify(GroundTransition::LeftGround, position);
        }
        None if flags.collided_below() => {
            if state.jump.is_jumping() && state.velocity.y <= 0.0 {
                state.jump.landed(&mut state.velocity);
                state.velocity = Vec3::ZERO;
            } else {
                state.velocity.y = state.velocity.y.max(0.0);
            }
        }
        None => {}
    }
    if flags.contains(CollisionFlags::ABOVE) && state.velocity.y > 0.0 {
        state.velocity.y = 0.0;
    }

    let on_ground = flags.collided_below();
    state.update_move_status(on_ground);

    let displacement = position - start;
    tracing::trace!(
        ?displacement,
        velocity = ?state.velocity,
        flags = flags.0,
        on_ground,
        "integrated"
    );
    TickReport {
        requested,
        displacement,
        flags,
        transition,
        on_ground,
    }
}

/// Desired planar velocity plus its magnitude before speed scaling (at most 1).
fn directional_impulse(state: &MoveState, forward: Vec3, right: Vec3) -> (Vec3, f32) {
    let a = &state.affectors;
    let raw = match state.control_mode {
        ControlMode::Impulse => forward * (a.forward - a.backward) + right * (a.right - a.left),
        ControlMode::Directional => {
            let dir = state.direction;
            let length = dir.length();
            if length <= f32::EPSILON {
                Vec3::ZERO
            } else {
                let angle = -dir.x.atan2(dir.y);
                rotate_about_up(forward, angle) * (length * a.forward)
            }
        }
    };
    let raw = if raw.length_squared() > 1.0 {
        raw.normalize()
    } else {
        raw
    };
    (raw * state.speed, raw.length())
}
