use crate::action::{ActionPacket, ControlMode};
use crate::ai::AiWander;
use crate::bindings::PlayerInput;

/// Producer of a character's per-tick intent.
///
/// The movement code is input-agnostic; only how the packet is produced
/// differs between variants.
#[derive(Debug, Clone)]
pub enum InputSource {
    Player(PlayerInput),
    Ai(AiWander),
}

impl InputSource {
    /// Produce the packet for the coming tick.
    pub fn next_packet(&mut self, dt: f32) -> ActionPacket {
        match self {
            Self::Player(input) => input.sample(),
            Self::Ai(ai) => ai.next_packet(dt),
        }
    }

    /// The control mode this source's packets are meant for.
    pub fn control_mode(&self) -> ControlMode {
        match self {
            Self::Player(_) => ControlMode::Impulse,
            Self::Ai(_) => ControlMode::Directional,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerInput> {
        match self {
            Self::Player(input) => Some(input),
            Self::Ai(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::MoveIntent;
    use crate::bindings::KeyBindings;

    #[test]
    fn player_source_samples_keys() {
        let mut src = InputSource::Player(PlayerInput::new(KeyBindings::default()));
        assert_eq!(src.control_mode(), ControlMode::Impulse);
        src.as_player_mut().unwrap().press("W");
        assert_eq!(src.next_packet(1.0 / 60.0).movement, MoveIntent::Forward);
    }

    #[test]
    fn ai_source_is_directional() {
        let mut src = InputSource::Ai(AiWander::new(1));
        assert_eq!(src.control_mode(), ControlMode::Directional);
        assert!(src.as_player_mut().is_none());
        assert!(src.next_packet(1.0 / 60.0).direction.is_some());
    }
}
