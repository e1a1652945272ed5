//! Shared types and math helpers used across the strider crates.
//!
//! # Invariants
//! - World space is right-handed with +Y up.
//! - Horizontal math ignores the Y component.

pub mod math;
pub mod types;

pub use math::{horizontal, rotate_about_up, smoothstep, splitmix64, yaw_from_direction};
pub use types::{EntityId, GravityProvider, Transform};

pub fn crate_info() -> &'static str {
    concat!("strider-common v", env!("CARGO_PKG_VERSION"))
}
