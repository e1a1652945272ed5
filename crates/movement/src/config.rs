//! Movement tuning constants and their on-disk form.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strider_input::ControlMode;
use strider_physics::{ControllerDesc, SurfaceMaterial};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Capsule dimensions and contact tuning used when a character spawns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsuleConfig {
    pub height: f32,
    pub radius: f32,
    pub step_offset: f32,
    pub contact_offset: f32,
    pub slope_limit_deg: f32,
    pub min_move_distance: f32,
    pub material: SurfaceMaterial,
}

impl Default for CapsuleConfig {
    fn default() -> Self {
        let desc = ControllerDesc::default();
        Self {
            height: desc.height,
            radius: desc.radius,
            step_offset: desc.step_offset,
            contact_offset: desc.contact_offset,
            slope_limit_deg: desc.slope_limit_deg,
            min_move_distance: desc.min_move_distance,
            material: desc.material,
        }
    }
}

impl CapsuleConfig {
    /// Controller descriptor for a capsule centered at `position`.
    pub fn descriptor(&self, position: glam::Vec3) -> ControllerDesc {
        ControllerDesc {
            position,
            height: self.height,
            radius: self.radius,
            material: self.material,
            step_offset: self.step_offset,
            contact_offset: self.contact_offset,
            slope_limit_deg: self.slope_limit_deg,
            min_move_distance: self.min_move_distance,
        }
    }
}

/// Every tuning constant of the movement model.
///
/// Rates are per second, speeds in meters per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Affector increase per second while its intent is held.
    pub acceleration: f32,
    /// Affector decrease per second once its intent is released.
    pub deceleration: f32,
    /// Seconds for run to ease fully in.
    pub run_ramp: f32,
    /// Seconds for crouch to ease fully in.
    pub crouch_ramp: f32,
    pub walk_speed: f32,
    pub run_multiplier: f32,
    pub crouch_multiplier: f32,
    pub jump_velocity: f32,
    /// Downward bias applied while grounded to keep contact reported.
    pub extra_gravity: f32,
    pub control_mode: ControlMode,
    pub capsule: CapsuleConfig,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            acceleration: 10.0,
            deceleration: 5.0,
            run_ramp: 0.25,
            crouch_ramp: 0.25,
            walk_speed: 3.0,
            run_multiplier: 2.0,
            crouch_multiplier: 0.5,
            jump_velocity: 5.0,
            extra_gravity: 0.1,
            control_mode: ControlMode::Impulse,
            capsule: CapsuleConfig::default(),
        }
    }
}

impl MovementConfig {
    /// Read a config from `.yaml`, `.yml` or `.json` and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded movement config");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values the integrator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rates = [
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("run_ramp", self.run_ramp),
            ("crouch_ramp", self.crouch_ramp),
            ("walk_speed", self.walk_speed),
            ("run_multiplier", self.run_multiplier),
            ("crouch_multiplier", self.crouch_multiplier),
            ("jump_velocity", self.jump_velocity),
            ("extra_gravity", self.extra_gravity),
        ];
        for (field, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite and non-negative, got {value}"),
                });
            }
        }
        self.capsule
            .descriptor(glam::Vec3::ZERO)
            .validate()
            .map_err(|e| ConfigError::Invalid {
                field: "capsule",
                reason: e.to_string(),
            })
    }

    /// Ground-plane speed for the given run and crouch ease values.
    pub fn speed_for(&self, run: f32, crouch: f32) -> f32 {
        let run_scale = 1.0 + (self.run_multiplier - 1.0) * run;
        let crouch_scale = 1.0 + (self.crouch_multiplier - 1.0) * crouch;
        self.walk_speed * run_scale * crouch_scale
    }
}
