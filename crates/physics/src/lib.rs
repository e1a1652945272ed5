//! Physics adapter: capsule controllers over a pluggable kinematic backend.
//!
//! # Invariants
//! - Each controller handle is owned by exactly one [`CapsuleController`] and
//!   released when it drops.
//! - Backend calls are synchronous; nothing here blocks or defers work.
//!
//! Two backends ship with the crate: [`SimpleWorld`], an analytic world of
//! floors and box columns used by tests and headless runs, and
//! `RapierWorld` (feature `rapier`), which drives Rapier's kinematic
//! character controller against static colliders.

pub mod backend;
pub mod controller;
pub mod flags;
pub mod geometry;
pub mod simple;

#[cfg(feature = "rapier")]
pub mod rapier;

pub use backend::{
    ControllerDesc, ControllerHandle, GroundHit, PhysicsBackend, PhysicsError, SurfaceMaterial,
};
pub use controller::{CapsuleController, SharedBackend, shared};
pub use flags::CollisionFlags;
pub use geometry::{StaticBox, StaticGeometry};
pub use simple::SimpleWorld;

#[cfg(feature = "rapier")]
pub use rapier::RapierWorld;

pub fn crate_info() -> &'static str {
    concat!("strider-physics v", env!("CARGO_PKG_VERSION"))
}
