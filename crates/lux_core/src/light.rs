//! Analytic light sources.

use lux_math::{Color, Vec3};
use std::f32::consts::FRAC_PI_2;

/// A light source.
///
/// Directions are normalized by the constructors; build lights through
/// [`Light::sun`], [`Light::point`] and [`Light::spot`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    /// Collimated light travelling along `direction`, no falloff.
    Sun { color: Color, direction: Vec3 },
    /// Omnidirectional light with inverse-square falloff.
    Point { color: Color, position: Vec3 },
    /// Cone light with inverse-square and angular falloff.
    Spot {
        color: Color,
        position: Vec3,
        direction: Vec3,
        /// Cone half-angle in radians, within [0, pi/2]
        half_angle: f32,
        exponent: f32,
    },
}

impl Light {
    /// Create a sun light shining along `direction`.
    pub fn sun(color: Color, direction: Vec3) -> Self {
        Light::Sun {
            color,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a point light.
    pub fn point(color: Color, position: Vec3) -> Self {
        Light::Point { color, position }
    }

    /// Create a spot light at `position` aimed along `direction`.
    pub fn spot(color: Color, position: Vec3, direction: Vec3, half_angle: f32, exponent: f32) -> Self {
        Light::Spot {
            color,
            position,
            direction: direction.normalize_or_zero(),
            half_angle: half_angle.clamp(0.0, FRAC_PI_2),
            exponent,
        }
    }

    /// Emitted colour (before falloff).
    pub fn color(&self) -> Color {
        match self {
            Light::Sun { color, .. } | Light::Point { color, .. } | Light::Spot { color, .. } => *color,
        }
    }
}
