//! Collision flags reported by a controller move.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bitmask of the sides a capsule touched during one move.
///
/// The movement code only ever inspects [`CollisionFlags::BELOW`]; the other
/// bits are reported for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionFlags(pub u8);

impl CollisionFlags {
    /// Nothing touched.
    pub const EMPTY: Self = Self(0);

    /// Blocked horizontally by a wall or an unclimbable step.
    pub const SIDES: Self = Self(1 << 0);

    /// Blocked from above by a ceiling.
    pub const ABOVE: Self = Self(1 << 1);

    /// Standing on something.
    pub const BELOW: Self = Self(1 << 2);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Shorthand for `contains(BELOW)`.
    #[inline]
    pub fn collided_below(self) -> bool {
        self.contains(Self::BELOW)
    }
}

impl BitOr for CollisionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for CollisionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
