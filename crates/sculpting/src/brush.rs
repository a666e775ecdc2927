//! Carve brush and falloff curves.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use winged::Sphere;

/// Falloff curve for brush influence.
///
/// Determines how brush strength decreases from center to edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FalloffCurve {
    /// Linear falloff: strength = 1 - distance/radius
    Linear = 0,
    /// Smooth falloff: hermite interpolation
    #[default]
    Smooth = 1,
    /// Sharp falloff: quadratic decay
    Sharp = 2,
    /// Constant: full strength within radius
    Constant = 3,
    /// Sphere: spherical falloff (sqrt-based)
    Sphere = 4,
}

impl FalloffCurve {
    /// Calculate falloff strength at a given normalized distance (0.0 = center, 1.0 = edge).
    pub fn evaluate(&self, normalized_distance: f32) -> f32 {
        let d = normalized_distance.clamp(0.0, 1.0);
        match self {
            FalloffCurve::Linear => 1.0 - d,
            FalloffCurve::Smooth => {
                let t = 1.0 - d;
                t * t * (3.0 - 2.0 * t)
            }
            FalloffCurve::Sharp => {
                let t = 1.0 - d;
                t * t
            }
            FalloffCurve::Constant => 1.0,
            FalloffCurve::Sphere => (1.0 - d * d).max(0.0).sqrt(),
        }
    }
}

/// A spherical carve brush placed on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarveBrush {
    /// World-space brush center
    pub position: Vec3,
    /// Radius of influence in world units
    pub radius: f32,
    /// Target edge length inside the brush
    pub detail: f32,
    /// Displacement at the brush center (negative carves inward)
    pub intensity: f32,
    pub falloff: FalloffCurve,
}

impl Default for CarveBrush {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: 0.25,
            detail: 0.05,
            intensity: 0.02,
            falloff: FalloffCurve::Smooth,
        }
    }
}

impl CarveBrush {
    pub fn new(position: Vec3, radius: f32, detail: f32) -> Self {
        Self {
            position,
            radius,
            detail,
            ..Default::default()
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_falloff(mut self, falloff: FalloffCurve) -> Self {
        self.falloff = falloff;
        self
    }

    /// Query volume of the brush.
    pub fn sphere(&self) -> Sphere {
        Sphere::new(self.position, self.radius)
    }

    /// Displacement for a point `distance` away from the center; zero
    /// outside the radius.
    pub fn displacement_at(&self, distance: f32) -> f32 {
        if self.radius <= 0.0 || distance > self.radius {
            return 0.0;
        }
        self.intensity * self.falloff.evaluate(distance / self.radius)
    }
}
