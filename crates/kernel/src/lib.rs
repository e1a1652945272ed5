//! World Kernel: authoritative world state and fixed-step character simulation.
//!
//! # Invariants
//! - Each tick runs every character's `think()` exactly once, input first.
//! - Given the same seed, config and inputs, two simulations hash identically.
//! - All world mutations flow through explicit operations and are logged;
//!   the log keeps at most [`EVENT_LOG_CAPACITY`] undrained events.

pub mod sim;
pub mod world;

pub use sim::{SimConfig, SimError, Simulation};
pub use world::{EVENT_LOG_CAPACITY, EntityData, World, WorldEvent};

pub fn crate_info() -> &'static str {
    concat!("strider-kernel v", env!("CARGO_PKG_VERSION"))
}
