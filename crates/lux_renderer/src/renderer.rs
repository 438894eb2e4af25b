//! Path integrator and the parallel render loop.
//!
//! Each path gathers next-event direct lighting at every vertex and continues
//! along a BSDF-sampled direction until it escapes, is absorbed or runs out
//! of bounces.

use crate::bsdf::sample_bsdf;
use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::lighting::direct_contribution;
use crate::{Camera, Film, Scene};
use lux_math::{Color, Ray};
use rand::RngCore;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Maximum path vertices before a path is cut off.
pub const DEFAULT_MAX_BOUNCES: u32 = 12;

/// Render configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Maximum ray bounce depth
    pub max_bounces: u32,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// Seed for every bucket's random stream
    pub seed: u64,
    /// Set to stop sampling early; pixels keep the samples already taken
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_bounces: DEFAULT_MAX_BOUNCES,
            bucket_size: DEFAULT_BUCKET_SIZE,
            seed: 0,
            cancel: None,
        }
    }
}

impl RenderConfig {
    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Radiance carried back along `ray`.
pub fn trace_path(scene: &Scene, ray: Ray, config: &RenderConfig, rng: &mut dyn RngCore) -> Color {
    let mut ray = ray;
    let mut weight = Color::ONE;
    let mut color = Color::ZERO;

    for _ in 0..config.max_bounces {
        let Some(hit) = scene.nearest_hit(&ray) else {
            color += scene.background * weight;
            break;
        };

        let material = &scene.materials[hit.material];
        let point = ray.at(hit.distance);
        color += weight
            * direct_contribution(scene, material, point, hit.normal, ray.direction, hit.uv);

        match sample_bsdf(material, hit.normal, ray.direction, hit.uv, rng) {
            Some(scatter) => {
                weight *= scatter.weight;
                ray = Ray::new(point, scatter.direction);
            }
            None => break,
        }
    }

    color
}

/// Sample one pixel. Returns the radiance sum and the number of samples taken.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    row: u32,
    col: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> (Color, u32) {
    let mut sum = Color::ZERO;
    let mut taken = 0;

    for _ in 0..camera.samples_per_pixel {
        if config.cancelled() {
            break;
        }
        let ray = camera.generate_ray(row, col, rng);
        sum += trace_path(scene, ray, config, rng);
        taken += 1;
    }

    (sum, taken)
}

/// Render the whole image in parallel buckets.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> Film {
    let start = Instant::now();
    let buckets = generate_buckets(camera.width, camera.height, config.bucket_size);
    log::info!(
        "Rendering {}x{} at {} spp in {} buckets",
        camera.width,
        camera.height,
        camera.samples_per_pixel,
        buckets.len()
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, scene, config))
        .collect();

    let mut film = Film::new(camera.width, camera.height);
    for result in &results {
        film.write_bucket(result);
    }

    if config.cancelled() {
        log::warn!(
            "Render cancelled after {} of {} samples",
            film.total_samples(),
            camera.width as u64 * camera.height as u64 * camera.samples_per_pixel as u64
        );
    }
    log::info!("Render finished in {:.2?}", start.elapsed());

    film
}
