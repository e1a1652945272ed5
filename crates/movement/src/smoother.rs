//! Input smoother: discrete intent in, eased affectors out.

use glam::Vec2;
use strider_common::smoothstep;
use strider_input::{ActionPacket, ControlMode, KeyEdge, MoveIntent, SidestepIntent};

use crate::config::MovementConfig;
use crate::state::{AffectorMask, CrouchStatus, MoveState};

/// Ease one tick of `packet` into `state`.
///
/// Must run before [`integrate`](crate::integrate) with the same `dt`.
/// A jump is only armed on a key-down edge while `on_ground`.
pub fn smooth_input(
    state: &mut MoveState,
    packet: &ActionPacket,
    on_ground: bool,
    config: &MovementConfig,
    dt: f32,
) {
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

    apply_edge(&mut state.run_held, packet.run);
    apply_edge(&mut state.crouch_held, packet.crouch);

    let targets = planar_targets(state, packet);
    let up = config.acceleration * dt;
    let down = config.deceleration * dt;
    let a = &mut state.affectors;
    for (value, bit) in [
        (&mut a.forward, AffectorMask::FORWARD),
        (&mut a.backward, AffectorMask::BACKWARD),
        (&mut a.left, AffectorMask::LEFT),
        (&mut a.right, AffectorMask::RIGHT),
    ] {
        let step = if targets.contains(bit) { up } else { -down };
        *value = (*value + step).clamp(0.0, 1.0);
    }

    state.run_time = ramp_time(state.run_time, state.run_held, config.run_ramp, dt);
    state.crouch_time = ramp_time(state.crouch_time, state.crouch_held, config.crouch_ramp, dt);
    state.affectors.run = ramp_ease(state.run_time, state.run_held, config.run_ramp);
    state.affectors.crouch = ramp_ease(state.crouch_time, state.crouch_held, config.crouch_ramp);

    if packet.jump == KeyEdge::KeyDown && on_ground && !state.jump.is_jumping() {
        state.jump_impulse = true;
    }

    state.active = state.affectors.active();
    state.speed = config.speed_for(state.affectors.run, state.affectors.crouch);
    state.crouch_status = match state.affectors.crouch {
        c if c >= 1.0 => CrouchStatus::Crouched,
        c if c > 0.0 => CrouchStatus::Crouching,
        _ => CrouchStatus::None,
    };
}

fn apply_edge(held: &mut bool, edge: KeyEdge) {
    match edge {
        KeyEdge::KeyDown => *held = true,
        KeyEdge::KeyUp => *held = false,
        KeyEdge::None => {}
    }
}

/// Which planar affectors ramp up this tick. Also latches the stick direction.
fn planar_targets(state: &mut MoveState, packet: &ActionPacket) -> AffectorMask {
    match state.control_mode {
        ControlMode::Impulse => {
            let mut mask = match packet.movement {
                MoveIntent::Forward => AffectorMask::FORWARD,
                MoveIntent::Backward => AffectorMask::BACKWARD,
                MoveIntent::None => AffectorMask::EMPTY,
            };
            mask |= match packet.sidestep {
                SidestepIntent::Left => AffectorMask::LEFT,
                SidestepIntent::Right => AffectorMask::RIGHT,
                SidestepIntent::None => AffectorMask::EMPTY,
            };
            mask
        }
        ControlMode::Directional => {
            let raw = packet.direction.unwrap_or(Vec2::ZERO);
            let dir = if raw.is_finite() {
                raw.clamp_length_max(1.0)
            } else {
                tracing::warn!(?raw, "ignoring non-finite input direction");
                Vec2::ZERO
            };
            if dir.length_squared() > 0.0 {
                // Keep the last direction while the affector winds down.
                state.direction = dir;
                AffectorMask::FORWARD
            } else {
                AffectorMask::EMPTY
            }
        }
    }
}

/// Advance a time-since-toggle accumulator, never leaving `[0, ramp]`.
fn ramp_time(time: f32, held: bool, ramp: f32, dt: f32) -> f32 {
    let ramp = ramp.max(0.0);
    let time = time.min(ramp);
    if held {
        (time + dt).min(ramp)
    } else {
        (time - dt).max(0.0)
    }
}

fn ramp_ease(time: f32, held: bool, ramp: f32) -> f32 {
    if ramp <= 0.0 {
        return if held { 1.0 } else { 0.0 };
    }
    if time >= ramp {
        1.0
    } else {
        smoothstep(time / ramp)
    }
}
