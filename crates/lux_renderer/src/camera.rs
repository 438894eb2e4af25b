//! Thin-lens camera for primary ray generation.

use crate::gen_f32;
use lux_math::{Mat3, Quat, Ray, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Camera looking down its local -Z axis with +Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    // Image settings
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,

    // Placement
    pub position: Vec3,
    pub orientation: Quat,

    // Lens settings
    pub fovy: f32,       // Vertical field of view in degrees
    pub f_number: f32,   // Aperture; large values approach a pinhole
    pub plane_dist: f32, // Distance from the lens to the image plane
    pub focus_dist: f32, // Distance to the plane of perfect focus
}

impl Camera {
    pub fn new() -> Self {
        Self {
            width: 160,
            height: 90,
            samples_per_pixel: 32,
            position: Vec3::new(10.0, 0.0, 0.0),
            orientation: Quat::IDENTITY,
            fovy: 50.0,
            f_number: 9999.0,
            plane_dist: 1.0,
            focus_dist: 10.0,
        }
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set samples per pixel.
    pub fn with_samples(mut self, samples_per_pixel: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self
    }

    /// Set position and orientation.
    pub fn with_pose(mut self, position: Vec3, orientation: Quat) -> Self {
        self.position = position;
        self.orientation = orientation.normalize();
        self
    }

    /// Place the camera at `position` aimed at `target`.
    ///
    /// `up` sets the roll. When it is parallel to the view direction the roll
    /// is arbitrary.
    pub fn looking_at(mut self, position: Vec3, target: Vec3, up: Vec3) -> Self {
        let back = (position - target).normalize_or_zero();
        // Any perpendicular axis will do when `up` is parallel to the view
        let right = up
            .cross(back)
            .try_normalize()
            .unwrap_or_else(|| back.any_orthonormal_vector());
        let true_up = back.cross(right);
        self.position = position;
        self.orientation = Quat::from_mat3(&Mat3::from_cols(right, true_up, back)).normalize();
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, fovy: f32, f_number: f32, plane_dist: f32, focus_dist: f32) -> Self {
        self.fovy = fovy;
        self.f_number = f_number;
        self.plane_dist = plane_dist;
        self.focus_dist = focus_dist;
        self
    }

    /// Image-plane distance between adjacent pixel centres at unit depth.
    pub fn pixel_spacing(&self) -> f32 {
        (self.fovy.to_radians() / 2.0).tan() / self.height as f32 * 2.0
    }

    /// Generate a jittered, lens-sampled primary ray through pixel (row, col).
    ///
    /// Consumes four random numbers: row jitter, column jitter, lens radius
    /// and lens angle.
    pub fn generate_ray(&self, row: u32, col: u32, rng: &mut dyn RngCore) -> Ray {
        let px = self.pixel_spacing();
        let rot = Mat3::from_quat(self.orientation);
        let forward = -rot.z_axis;
        let right = rot.x_axis * px;
        let up = rot.y_axis * px;

        let y = (row as f32 - self.height as f32 / 2.0) + gen_f32(rng);
        let x = (col as f32 - self.width as f32 / 2.0) + gen_f32(rng);

        // Lens offset in pixel units
        let radius = self.plane_dist / px / self.f_number * gen_f32(rng).sqrt();
        let angle = gen_f32(rng) * 2.0 * PI;
        let (lens_y, lens_x) = angle.sin_cos();

        let pinhole = (forward + right * x - up * y).normalize();
        let focal = self.position + pinhole * self.focus_dist;

        let origin = self.position
            + (forward + right * (x + lens_x * radius) - up * (y + lens_y * radius)) * self.plane_dist;
        Ray::normalized(origin, focal - origin)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::default();
        assert_eq!((camera.width, camera.height), (160, 90));
        assert_eq!(camera.samples_per_pixel, 32);
        assert_eq!(camera.position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_center_pixel_looks_forward() {
        let camera = Camera::new()
            .with_resolution(64, 64)
            .with_pose(Vec3::ZERO, Quat::IDENTITY)
            .with_lens(60.0, f32::INFINITY, 1.0, 10.0);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..20 {
            let ray = camera.generate_ray(32, 32, &mut rng);
            assert!((ray.direction.length() - 1.0).abs() < 1e-5);
            // Within a pixel of straight ahead
            assert!(ray.direction.z < -0.999);
            assert!(ray.direction.x >= -1e-6);
            assert!(ray.direction.y <= 1e-6);
        }
    }

    #[test]
    fn test_top_row_points_up() {
        let camera = Camera::new()
            .with_resolution(64, 64)
            .with_pose(Vec3::ZERO, Quat::IDENTITY)
            .with_lens(90.0, f32::INFINITY, 1.0, 10.0);
        let mut rng = StdRng::seed_from_u64(1);

        let top = camera.generate_ray(0, 32, &mut rng);
        assert!(top.direction.y > 0.6);
        let left = camera.generate_ray(32, 0, &mut rng);
        assert!(left.direction.x < -0.6);
    }

    #[test]
    fn test_depth_of_field_converges_at_focus() {
        let camera = Camera::new()
            .with_resolution(32, 32)
            .with_pose(Vec3::ZERO, Quat::IDENTITY)
            .with_lens(40.0, 2.0, 0.5, 8.0);
        let mut rng = StdRng::seed_from_u64(9);

        let mut origins_differ = false;
        let first = camera.generate_ray(16, 16, &mut rng);
        for _ in 0..50 {
            let ray = camera.generate_ray(16, 16, &mut rng);
            origins_differ |= (ray.origin - first.origin).length() > 1e-3;
            // Every ray passes near the focal plane point of its pixel
            let t = (-8.0 - ray.origin.z) / ray.direction.z;
            let at_focus = ray.at(t);
            assert!(at_focus.truncate().length() < 8.0 * camera.pixel_spacing() * 2.0);
        }
        assert!(origins_differ);
    }

    #[test]
    fn test_looking_at_orientation() {
        let camera = Camera::new()
            .with_resolution(16, 16)
            .looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(5);
        let ray = camera
            .with_lens(30.0, f32::INFINITY, 1.0, 10.0)
            .generate_ray(8, 8, &mut rng);
        assert!(ray.direction.z < -0.99);

        let down = Camera::new().looking_at(Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, Vec3::Z);
        let forward = -(Mat3::from_quat(down.orientation).z_axis);
        assert!((forward - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_looking_at_with_parallel_up() {
        // Straight down with +Z up: the up hint carries no roll information
        let camera = Camera::new().looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Z);
        assert!((camera.orientation.length() - 1.0).abs() < 1e-5);

        let basis = Mat3::from_quat(camera.orientation);
        assert!((-basis.z_axis - Vec3::NEG_Z).length() < 1e-5);
        assert!((basis.x_axis.length() - 1.0).abs() < 1e-5);
        assert!((basis.y_axis.length() - 1.0).abs() < 1e-5);
        assert!(basis.x_axis.dot(basis.y_axis).abs() < 1e-5);
        assert!(basis.x_axis.dot(Vec3::Z).abs() < 1e-5);
    }
}
