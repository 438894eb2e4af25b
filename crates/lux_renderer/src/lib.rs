//! Lux Renderer - CPU path tracing.
//!
//! A unidirectional Monte Carlo path tracer with next-event estimation,
//! BSDF importance sampling and a thin-lens camera.

mod bsdf;
mod bucket;
mod bvh;
mod camera;
mod film;
mod hit;
mod lighting;
mod renderer;
mod scene;
mod sphere;
mod triangle;

pub use bsdf::{sample_bsdf, Scatter};
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{BvhNode, CandidateTriangle};
pub use camera::Camera;
pub use film::{tonemap, Film};
pub use hit::{Hit, HIT_EPSILON};
pub use lighting::direct_contribution;
pub use renderer::{render, render_pixel, trace_path, RenderConfig, DEFAULT_MAX_BOUNCES};
pub use scene::{Scene, SceneBuilder, SceneError};
pub use sphere::{intersect_sphere, sphere_roots, sphere_uv};
pub use triangle::{intersect_triangle, TriangleHit};

/// Re-export the math and scene data types the renderer works with
pub use lux_core::{IllumModel, Light, Material, Mesh, Sphere, Texture};
pub use lux_math::{Aabb, Color, Interval, Quat, Ray, Vec2, Vec3};

use rand::{Rng, RngCore};

/// Uniform sample in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}
