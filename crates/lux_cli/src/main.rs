//! `lux`: render a JSON scene (or the built-in demo) to a PNG.
//!
//! Usage: `lux [SCENE.json] [OUTPUT.png]`

mod demo;
mod scene_file;

use anyhow::{Context, Result};
use lux_renderer::render;
use scene_file::SceneFile;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DEFAULT_OUTPUT: &str = "result.png";

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.iter().skip(1).any(|a| a == "-h" || a == "--help") {
        println!("Usage: {} [SCENE.json] [OUTPUT.png]", args[0]);
        println!("Renders the built-in demo scene when no scene file is given.");
        return Ok(());
    }

    let start = Instant::now();
    let (scene, camera, config) = match args.get(1) {
        Some(path) => {
            let path = Path::new(path);
            log::info!("Loading scene {}", path.display());
            let file = SceneFile::load(path)?;
            file.build(path.parent().unwrap_or(Path::new(".")))?
        }
        None => {
            log::info!("No scene file given, rendering the built-in demo");
            demo::build()?
        }
    };
    log::info!("Scene ready in {:.2?}", start.elapsed());

    let film = render(&camera, &scene, &config);

    let output = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
    film.save_png(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Wrote {}", output.display());

    Ok(())
}
