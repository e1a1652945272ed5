use glam::Vec2;
use serde::{Deserialize, Serialize};
use strider_common::splitmix64;

use crate::action::{ActionPacket, KeyEdge};

/// Shortest and longest time (seconds) a wander phase lasts.
const PHASE_MIN_SECS: f32 = 0.5;
const PHASE_MAX_SECS: f32 = 3.0;

/// Chance that a new walk phase starts with a jump.
const JUMP_CHANCE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
enum WanderPhase {
    Idle,
    Walk { direction: Vec2 },
}

/// Deterministic wandering AI producing directional action packets.
///
/// Alternates idle and walk phases of random length. Randomness comes from a
/// splitmix64 stream, so the same seed always produces the same packets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiWander {
    rng: u64,
    phase: WanderPhase,
    remaining: f32,
    jump_held: bool,
}

impl AiWander {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seed,
            phase: WanderPhase::Idle,
            remaining: 0.0,
            jump_held: false,
        }
    }

    /// True while the AI is in a walk phase.
    pub fn is_walking(&self) -> bool {
        matches!(self.phase, WanderPhase::Walk { .. })
    }

    /// Advance the wander timer by `dt` and produce this tick's packet.
    pub fn next_packet(&mut self, dt: f32) -> ActionPacket {
        let mut jump = KeyEdge::None;
        if self.jump_held {
            self.jump_held = false;
            jump = KeyEdge::KeyUp;
        }

        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.remaining = PHASE_MIN_SECS + self.next_unit() * (PHASE_MAX_SECS - PHASE_MIN_SECS);
            self.phase = match self.phase {
                WanderPhase::Idle => {
                    let angle = self.next_unit() * std::f32::consts::TAU;
                    if self.next_unit() < JUMP_CHANCE {
                        jump = KeyEdge::KeyDown;
                        self.jump_held = true;
                    }
                    WanderPhase::Walk {
                        direction: Vec2::new(angle.sin(), angle.cos()),
                    }
                }
                WanderPhase::Walk { .. } => WanderPhase::Idle,
            };
            tracing::trace!(phase = ?self.phase, secs = self.remaining, "ai wander phase");
        }

        let direction = match self.phase {
            WanderPhase::Idle => Vec2::ZERO,
            WanderPhase::Walk { direction } => direction,
        };
        ActionPacket {
            direction: Some(direction),
            jump,
            ..ActionPacket::default()
        }
    }

    /// Uniform value in [0, 1).
    fn next_unit(&mut self) -> f32 {
        self.rng = splitmix64(self.rng);
        (self.rng >> 40) as f32 / (1u64 << 24) as f32
    }
}
