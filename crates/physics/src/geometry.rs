//! Backend-neutral description of static level geometry.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned solid box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaticBox {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl StaticBox {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    /// Height of the top face.
    pub fn top(&self) -> f32 {
        self.center.y + self.half_extents.y
    }

    /// Whether the box footprint covers the horizontal point `(x, z)`.
    pub fn covers(&self, x: f32, z: f32) -> bool {
        (x - self.center.x).abs() <= self.half_extents.x
            && (z - self.center.z).abs() <= self.half_extents.z
    }
}

/// Static world: an optional infinite floor plus solid boxes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticGeometry {
    /// Height of an infinite horizontal floor, if any.
    pub floor: Option<f32>,
    pub boxes: Vec<StaticBox>,
}

impl StaticGeometry {
    /// Infinite flat floor at `height` and nothing else.
    pub fn flat(height: f32) -> Self {
        Self {
            floor: Some(height),
            boxes: Vec::new(),
        }
    }

    pub fn with_box(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.boxes.push(StaticBox::new(center, half_extents));
        self
    }
}
