//! Built-in scene rendered when no scene file is given.

use anyhow::{Context, Result};
use lux_core::{sweep, Material, Mesh, SweepDefinition};
use lux_math::{Color, Quat, Vec2, Vec3};
use lux_renderer::{Camera, Light, RenderConfig, Scene};
use std::f32::consts::PI;

/// Three spheres, a glass marble, a copper half-ring and a ground plane
/// under two suns and a red spot.
pub fn build() -> Result<(Scene, Camera, RenderConfig)> {
    let ivory = Material::new("ivory", Color::new(0.8, 0.78, 0.72))
        .with_specular(Color::splat(0.1), 64.0);
    let glass = Material::new("glass", Color::splat(0.05))
        .with_specular(Color::splat(0.05), 800.0)
        .with_refraction(Color::splat(0.85), 1.5);
    let copper = Material::new("copper", Color::new(0.55, 0.3, 0.18))
        .with_specular(Color::new(0.35, 0.25, 0.2), 200.0);

    let mut builder = Scene::builder();
    builder
        .add_light(Light::sun(
            Color::new(1.0, 0.896, 0.623) * 4.0,
            Vec3::new(-7.26, -0.48, -4.60),
        ))
        .add_light(Light::spot(
            Color::new(1.0, 0.03, 0.03) * 50.0,
            Vec3::new(2.00, -5.15, 6.77),
            Vec3::new(-0.30, 0.51, -0.74),
            0.5,
            1.0,
        ))
        .add_light(Light::sun(
            Color::new(0.296, 0.750, 1.0) * 10.0,
            Vec3::new(2.26, 0.10, -0.70),
        ))
        .background(Color::splat(0.4));

    builder
        .add_sphere(Vec3::new(-4.96, 0.36, 1.18), 1.18, ivory.clone(), Quat::IDENTITY)
        .add_sphere(Vec3::new(-1.77, 3.14, 1.80), 1.80, ivory.clone(), Quat::IDENTITY)
        .add_sphere(Vec3::new(2.36, 2.85, 0.95), 0.95, ivory, Quat::IDENTITY)
        .add_sphere(
            Vec3::new(2.70, -0.13, 0.49),
            0.49,
            glass,
            Quat::from_axis_angle(Vec3::Z, PI * 1.7),
        );

    builder.add_mesh(ground(20.0));

    let definition = SweepDefinition::parse(&half_ring(Vec3::new(-0.5, -2.5, 0.35), 2.0, 0.3))
        .context("Built-in sweep definition is malformed")?;
    builder.add_mesh(sweep(&definition, 2, copper)?);

    let camera = Camera::new()
        .with_resolution(640, 360)
        .with_samples(64)
        .with_pose(
            Vec3::new(7.1806, -6.3057, 4.1167),
            Quat::from_xyzw(0.508, 0.238, 0.352, 0.749),
        )
        .with_lens(24.0, 2.0, 0.5, 8.5);

    Ok((builder.build()?, camera, RenderConfig::default()))
}

/// Square ground plane at z = 0.
fn ground(half: f32) -> Mesh {
    let mut mesh = Mesh::new();
    mesh.materials.push(
        Material::new("ground", Color::splat(0.5)).with_specular(Color::splat(0.02), 16.0),
    );

    let corners = [
        Vec3::new(-half, -half, 0.0),
        Vec3::new(half, -half, 0.0),
        Vec3::new(half, half, 0.0),
        Vec3::new(-half, half, 0.0),
    ];
    let uvs = [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
    let normals = [Vec3::Z; 3];
    mesh.push_triangle([corners[0], corners[1], corners[2]], normals, [uvs[0], uvs[1], uvs[2]], 0);
    mesh.push_triangle([corners[0], corners[2], corners[3]], normals, [uvs[0], uvs[2], uvs[3]], 0);
    mesh
}

/// Sweep text for a tube of radius `thickness` following half a circle in
/// the XY plane.
fn half_ring(center: Vec3, radius: f32, thickness: f32) -> String {
    const SECTIONS: usize = 5;
    let mut text = format!("CATMULL_ROM\n{} 4\n", SECTIONS);
    for k in 0..SECTIONS {
        let theta = PI * k as f32 / (SECTIONS - 1) as f32;
        let position = center + Vec3::new(theta.cos(), theta.sin(), 0.0) * radius;
        // Local Y follows the tangent
        text.push_str("1 0  0 1  -1 0  0 -1\n");
        text.push_str(&format!("{}\n{} 0 0 1\n", thickness, theta));
        text.push_str(&format!("{} {} {}\n", position.x, position.y, position.z));
    }
    text
}
