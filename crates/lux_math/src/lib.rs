//! Lux math - vector types and ray/box primitives shared by every crate.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// RGB radiance or reflectance, linear space.
pub type Color = Vec3;
