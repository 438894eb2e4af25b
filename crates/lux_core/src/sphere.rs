//! Analytic sphere primitive.

use lux_math::{Quat, Vec3};

/// A sphere placed in a scene.
///
/// `orientation` rotates surface normals into the frame used for UV mapping;
/// `material` indexes the owning scene's material list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub orientation: Quat,
    pub material: usize,
}

impl Sphere {
    /// Create a sphere with identity UV orientation.
    pub fn new(center: Vec3, radius: f32, material: usize) -> Self {
        Self {
            center,
            radius,
            orientation: Quat::IDENTITY,
            material,
        }
    }

    /// Set the UV orientation.
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation.normalize();
        self
    }
}
