use glam::Vec2;
use serde::{Deserialize, Serialize};

/// How movement intent is expressed for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// Four independent forward/backward/left/right affectors.
    #[default]
    Impulse,
    /// One 2D direction plus magnitude, applied through the forward affector.
    Directional,
}

/// Level-triggered forward/backward intent for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveIntent {
    #[default]
    None,
    Forward,
    Backward,
}

/// Level-triggered sidestep intent for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SidestepIntent {
    #[default]
    None,
    Left,
    Right,
}

/// Edge of a held key observed during this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyEdge {
    #[default]
    None,
    KeyDown,
    KeyUp,
}

/// Discrete intent for one simulation tick.
///
/// Produced by an [`InputSource`](crate::InputSource), consumed by the input
/// smoother. Carries no physics knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionPacket {
    pub movement: MoveIntent,
    pub sidestep: SidestepIntent,
    pub jump: KeyEdge,
    pub run: KeyEdge,
    pub crouch: KeyEdge,
    /// Raw stick direction for directional control: `x` is right, `y` is forward.
    pub direction: Option<Vec2>,
}

impl ActionPacket {
    /// Packet with no intent at all.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Shorthand for a packet that only moves forward.
    pub fn forward() -> Self {
        Self {
            movement: MoveIntent::Forward,
            ..Self::default()
        }
    }

    /// Shorthand for a directional packet.
    pub fn towards(direction: Vec2) -> Self {
        Self {
            direction: Some(direction),
            ..Self::default()
        }
    }

    pub fn with_jump(mut self, edge: KeyEdge) -> Self {
        self.jump = edge;
        self
    }

    pub fn with_run(mut self, edge: KeyEdge) -> Self {
        self.run = edge;
        self
    }

    pub fn with_crouch(mut self, edge: KeyEdge) -> Self {
        self.crouch = edge;
        self
    }

    pub fn with_sidestep(mut self, sidestep: SidestepIntent) -> Self {
        self.sidestep = sidestep;
        self
    }

    /// True when nothing at all is requested this tick.
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}
