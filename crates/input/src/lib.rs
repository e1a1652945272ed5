//! Intent producers: player keys and AI wander mapped to one action packet.
//!
//! # Invariants
//! - Player and AI produce the same `ActionPacket`; the movement code never
//!   sees which one produced it.
//! - Key bindings are explicit configuration, never global state.

pub mod action;
pub mod ai;
pub mod bindings;
pub mod source;

pub use action::{ActionPacket, ControlMode, KeyEdge, MoveIntent, SidestepIntent};
pub use ai::AiWander;
pub use bindings::{Binding, KeyBindings, PlayerInput};
pub use source::InputSource;

pub fn crate_info() -> &'static str {
    concat!("strider-input v", env!("CARGO_PKG_VERSION"))
}
