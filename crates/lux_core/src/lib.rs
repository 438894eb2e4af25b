//! Lux Core - renderer-agnostic scene data.
//!
//! This crate provides:
//!
//! - **Scene data types**: `Material`, `Texture`, `Light`, `Mesh`, `Sphere`
//! - **Loaders**: OBJ/MTL triangle soups and swept-surface meshes
//!
//! # Example
//!
//! ```ignore
//! use lux_core::{load_obj, load_swept_surface, Material};
//!
//! let room = load_obj("data/main.obj")?;
//! let knot = load_swept_surface("data/knot.txt", 2, Material::default())?;
//! println!("{} + {} triangles", room.triangle_count(), knot.triangle_count());
//! ```

pub mod error;
pub mod light;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod sphere;
pub mod swept;
pub mod texture;

// Re-export commonly used types
pub use error::{LoadError, LoadResult};
pub use light::Light;
pub use material::{IllumModel, Material};
pub use mesh::Mesh;
pub use obj::{load_mtl, load_obj};
pub use sphere::Sphere;
pub use swept::{load_swept_surface, sweep, CurveKind, Section, SweepDefinition};
pub use texture::{Texture, TextureCache};
