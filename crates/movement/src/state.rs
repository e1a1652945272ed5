//! Per-character movement state carried across ticks.

use std::ops::{BitOr, BitOrAssign};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use strider_input::ControlMode;

use crate::jump::JumpState;

/// Coarse locomotion classification for animation and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveStatus {
    #[default]
    Idle,
    Walking,
    Running,
    InAir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrouchStatus {
    #[default]
    None,
    Crouching,
    Crouched,
}

/// Eased intent scalars, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Affectors {
    pub forward: f32,
    pub backward: f32,
    pub left: f32,
    pub right: f32,
    pub run: f32,
    pub crouch: f32,
}

impl Affectors {
    pub fn iter(&self) -> impl Iterator<Item = (AffectorMask, f32)> {
        [
            (AffectorMask::FORWARD, self.forward),
            (AffectorMask::BACKWARD, self.backward),
            (AffectorMask::LEFT, self.left),
            (AffectorMask::RIGHT, self.right),
            (AffectorMask::RUN, self.run),
            (AffectorMask::CROUCH, self.crouch),
        ]
        .into_iter()
    }

    /// Bits of every affector that is currently nonzero.
    pub fn active(&self) -> AffectorMask {
        self.iter()
            .filter(|(_, v)| *v > 0.0)
            .fold(AffectorMask::EMPTY, |mask, (bit, _)| mask | bit)
    }
}

/// Bit set of nonzero affectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct AffectorMask(pub u8);

impl AffectorMask {
    pub const EMPTY: Self = Self(0);
    pub const FORWARD: Self = Self(1 << 0);
    pub const BACKWARD: Self = Self(1 << 1);
    pub const LEFT: Self = Self(1 << 2);
    pub const RIGHT: Self = Self(1 << 3);
    pub const RUN: Self = Self(1 << 4);
    pub const CROUCH: Self = Self(1 << 5);
    pub const PLANAR: Self = Self(0b1111);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AffectorMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AffectorMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Everything the smoother and integrator mutate for one character.
///
/// Written only by the owning character's tick; observers read through
/// the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveState {
    pub(crate) control_mode: ControlMode,
    pub(crate) affectors: Affectors,
    pub(crate) active: AffectorMask,
    pub(crate) speed: f32,
    pub(crate) heading: Vec3,
    pub(crate) facing: Vec3,
    pub(crate) directional: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) move_status: MoveStatus,
    pub(crate) crouch_status: CrouchStatus,
    pub(crate) jump_impulse: bool,
    pub(crate) jump: JumpState,
    pub(crate) run_time: f32,
    pub(crate) crouch_time: f32,
    pub(crate) run_held: bool,
    pub(crate) crouch_held: bool,
    pub(crate) direction: Vec2,
}

impl MoveState {
    pub fn new(control_mode: ControlMode, walk_speed: f32, jump_velocity: f32) -> Self {
        Self {
            control_mode,
            affectors: Affectors::default(),
            active: AffectorMask::EMPTY,
            speed: walk_speed,
            heading: Vec3::NEG_Z,
            facing: Vec3::NEG_Z,
            directional: Vec3::ZERO,
            velocity: Vec3::ZERO,
            move_status: MoveStatus::Idle,
            crouch_status: CrouchStatus::None,
            jump_impulse: false,
            jump: JumpState::new(jump_velocity),
            run_time: 0.0,
            crouch_time: 0.0,
            run_held: false,
            crouch_held: false,
            direction: Vec2::ZERO,
        }
    }

    pub fn control_mode(&self) -> ControlMode {
        self.control_mode
    }

    pub fn set_control_mode(&mut self, mode: ControlMode) {
        self.control_mode = mode;
    }

    pub fn affectors(&self) -> &Affectors {
        &self.affectors
    }

    pub fn active(&self) -> AffectorMask {
        self.active
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Horizontal look direction that movement is relative to.
    pub fn heading(&self) -> Vec3 {
        self.heading
    }

    /// Point the character along `heading`; ignored if it has no horizontal extent.
    pub fn set_heading(&mut self, heading: Vec3) {
        let flat = strider_common::horizontal(heading);
        if flat.is_finite() && flat.length_squared() > f32::EPSILON {
            self.heading = flat.normalize();
        } else {
            tracing::warn!(?heading, "ignoring degenerate heading");
        }
    }

    /// Direction of the most recent nonzero movement.
    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    /// Desired ground velocity computed on the last tick.
    pub fn directional(&self) -> Vec3 {
        self.directional
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn move_status(&self) -> MoveStatus {
        self.move_status
    }

    pub fn crouch_status(&self) -> CrouchStatus {
        self.crouch_status
    }

    pub fn jump_pending(&self) -> bool {
        self.jump_impulse
    }

    pub fn jump(&self) -> &JumpState {
        &self.jump
    }

    pub fn run_time(&self) -> f32 {
        self.run_time
    }

    pub fn crouch_time(&self) -> f32 {
        self.crouch_time
    }

    /// Drop all motion and pending intent, keeping heading and tuning.
    pub fn reset_motion(&mut self) {
        self.affectors = Affectors::default();
        self.active = AffectorMask::EMPTY;
        self.directional = Vec3::ZERO;
        self.velocity = Vec3::ZERO;
        self.jump_impulse = false;
        self.jump.reset();
        self.run_time = 0.0;
        self.crouch_time = 0.0;
        self.run_held = false;
        self.crouch_held = false;
        self.direction = Vec2::ZERO;
        self.move_status = MoveStatus::Idle;
        self.crouch_status = CrouchStatus::None;
    }

    /// Reclassify locomotion after a tick.
    pub(crate) fn update_move_status(&mut self, on_ground: bool) {
        let moving = strider_common::horizontal(self.directional).length_squared() > 1.0e-8;
        self.move_status = if !on_ground {
            MoveStatus::InAir
        } else if moving && self.affectors.run > 0.5 {
            MoveStatus::Running
        } else if moving {
            MoveStatus::Walking
        } else {
            MoveStatus::Idle
        };
    }
}
