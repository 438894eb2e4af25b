//! Errors raised while loading scene assets.

use thiserror::Error;

/// Errors that can occur while loading meshes, materials and textures.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid swept surface: {0}")]
    Sweep(String),

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;
