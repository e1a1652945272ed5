//! Small vector helpers for horizontal movement math.

use glam::{Quat, Vec2, Vec3};

/// Drop the vertical component of `v`.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Rotate `v` about +Y by `angle` radians (counter-clockwise seen from above).
#[inline]
pub fn rotate_about_up(v: Vec3, angle: f32) -> Vec3 {
    Quat::from_rotation_y(angle) * v
}

/// Cubic ease `3x² − 2x³`, with `x` clamped to [0, 1].
#[inline]
pub fn smoothstep(x: f32) -> f32 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Yaw (radians about +Y) that turns the -Z forward axis onto `dir`.
///
/// Returns `None` when `dir` has no horizontal extent.
pub fn yaw_from_direction(dir: Vec3) -> Option<f32> {
    let flat = Vec2::new(dir.x, dir.z);
    if flat.length_squared() <= f32::EPSILON {
        return None;
    }
    Some((-flat.x).atan2(-flat.y))
}

/// Splitmix64 step: a fast, reproducible PRNG advance.
///
/// Used for world seeds, entity ids and AI randomness so runs with the same
/// seed reproduce bit for bit.
pub fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
