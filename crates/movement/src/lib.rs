//! Character movement: turns per-tick intent into a simulated capsule move.
//!
//! Per tick, in order: the input smoother eases the action packet into
//! affectors, the integrator builds a velocity and sweeps the capsule, and
//! the ground detector turns the returned flags into hit/leave transitions.
//!
//! # Invariants
//! - Exactly one integration step per character per tick.
//! - Velocity and jump state are mutated only by the owning character's tick.
//! - Nothing in a tick returns an error; only spawning and config loading can fail.

pub mod character;
pub mod config;
pub mod ground;
pub mod integrator;
pub mod jump;
pub mod smoother;
pub mod state;

pub use character::{Character, SpawnError};
pub use config::{CapsuleConfig, ConfigError, MovementConfig};
pub use ground::{GroundHooks, GroundTransition, detect_transition};
pub use integrator::{TickReport, integrate};
pub use jump::{JumpPhase, JumpState};
pub use smoother::smooth_input;
pub use state::{AffectorMask, Affectors, CrouchStatus, MoveState, MoveStatus};
pub use strider_input::ControlMode;

pub fn crate_info() -> &'static str {
    concat!("strider-movement v", env!("CARGO_PKG_VERSION"))
}
