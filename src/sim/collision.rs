//! Axis-aligned body bounds
//!
//! Every body in the game is an unrotated rectangle. Contact detection is the
//! physics engine's job; these bounds are what layout code and renderers read.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (min is top-left in screen space)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box of `size` centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}
