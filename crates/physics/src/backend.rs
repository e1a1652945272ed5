//! The contract between the movement code and a physics engine.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::flags::CollisionFlags;

/// Opaque id of a controller inside one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControllerHandle(pub u32);

/// Errors from controller construction.
///
/// Only spawning can fail; per-tick operations recover locally.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("invalid controller descriptor: {reason}")]
    InvalidDescriptor { reason: String },
    #[error("backend could not create controller: {0}")]
    ControllerCreation(String),
    #[error("unknown controller handle {0:?}")]
    UnknownHandle(ControllerHandle),
}

/// Contact material of a capsule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    pub static_friction: f32,
    pub dynamic_friction: f32,
    pub restitution: f32,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            static_friction: 0.5,
            dynamic_friction: 0.5,
            restitution: 0.0,
        }
    }
}

/// Everything a backend needs to create a capsule controller.
///
/// `height` is the length of the cylindrical section; the full capsule is
/// `height + 2 * radius` tall and `position` is its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerDesc {
    pub position: Vec3,
    pub height: f32,
    pub radius: f32,
    pub material: SurfaceMaterial,
    /// Highest ledge the capsule climbs without jumping (meters).
    pub step_offset: f32,
    /// Skin width kept between the capsule and geometry (meters).
    pub contact_offset: f32,
    /// Steepest walkable slope (degrees).
    pub slope_limit_deg: f32,
    /// Moves shorter than this are dropped by the backend (meters).
    pub min_move_distance: f32,
}

impl Default for ControllerDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            height: 1.0,
            radius: 0.4,
            material: SurfaceMaterial::default(),
            step_offset: 0.35,
            contact_offset: 0.01,
            slope_limit_deg: 45.0,
            min_move_distance: 1.0e-4,
        }
    }
}

impl ControllerDesc {
    /// Distance from the capsule center to the bottom of its hemisphere.
    pub fn half_extent(&self) -> f32 {
        self.height * 0.5 + self.radius
    }

    /// Check that the descriptor describes a capsule a backend can build.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        let invalid = |reason: &str| {
            Err(PhysicsError::InvalidDescriptor {
                reason: reason.to_string(),
            })
        };
        if !self.position.is_finite() {
            return invalid("position is not finite");
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return invalid("height must be positive");
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return invalid("radius must be positive");
        }
        if !(self.step_offset >= 0.0 && self.step_offset <= self.height + 2.0 * self.radius) {
            return invalid("step offset must lie within the capsule height");
        }
        if !(self.contact_offset.is_finite() && self.contact_offset > 0.0) {
            return invalid("contact offset must be positive");
        }
        if !(0.0..90.0).contains(&self.slope_limit_deg) {
            return invalid("slope limit must be in [0, 90) degrees");
        }
        if !(self.min_move_distance.is_finite() && self.min_move_distance >= 0.0) {
            return invalid("minimum move distance must be non-negative");
        }
        Ok(())
    }
}

/// Result of a downward ground probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub point: Vec3,
    pub normal: Vec3,
}

/// A kinematic physics engine able to sweep capsules through static geometry.
///
/// All methods run synchronously on the simulation thread.
pub trait PhysicsBackend {
    /// Create a capsule controller. The descriptor has already been validated.
    fn create_controller(&mut self, desc: &ControllerDesc)
    -> Result<ControllerHandle, PhysicsError>;

    /// Sweep the controller by `displacement`, sliding along geometry.
    ///
    /// Displacements shorter than `min_distance` are not applied. Unknown
    /// handles yield empty flags.
    fn move_controller(
        &mut self,
        handle: ControllerHandle,
        displacement: Vec3,
        min_distance: f32,
        dt: f32,
    ) -> CollisionFlags;

    /// Probe straight down from `origin` for at most `max_distance`.
    fn ground_query(&self, origin: Vec3, max_distance: f32) -> Option<GroundHit>;

    fn position(&self, handle: ControllerHandle) -> Option<Vec3>;

    /// Teleport the controller without collision.
    fn set_position(&mut self, handle: ControllerHandle, position: Vec3)
    -> Result<(), PhysicsError>;

    /// Destroy the controller. Releasing an unknown handle is a no-op.
    fn release_controller(&mut self, handle: ControllerHandle);

    /// Number of live controllers.
    fn controller_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_desc_is_valid() {
        let desc = ControllerDesc::default();
        assert!(desc.validate().is_ok());
        assert!((desc.half_extent() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        let desc = ControllerDesc {
            radius: 0.0,
            ..ControllerDesc::default()
        };
        assert!(matches!(
            desc.validate(),
            Err(PhysicsError::InvalidDescriptor { .. })
        ));

        let desc = ControllerDesc {
            height: -1.0,
            ..ControllerDesc::default()
        };
        assert!(desc.validate().is_err());
    }

    #[test]
    fn rejects_nan_position_and_bad_slope() {
        let desc = ControllerDesc {
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            ..ControllerDesc::default()
        };
        assert!(desc.validate().is_err());

        let desc = ControllerDesc {
            slope_limit_deg: 90.0,
            ..ControllerDesc::default()
        };
        assert!(desc.validate().is_err());
    }

    #[test]
    fn rejects_step_taller_than_capsule() {
        let desc = ControllerDesc {
            step_offset: 10.0,
            ..ControllerDesc::default()
        };
        let err = desc.validate().unwrap_err();
        assert!(err.to_string().contains("step offset"));
    }
}
