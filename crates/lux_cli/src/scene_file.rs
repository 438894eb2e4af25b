//! JSON scene description.
//!
//! Relative asset paths are resolved against the scene file's directory.
//! Vectors are `[x, y, z]` arrays; quaternions are `[x, y, z, w]`.

use anyhow::{Context, Result};
use lux_core::{load_mtl, load_obj, load_swept_surface, LoadError, Material, TextureCache};
use lux_math::{Color, Quat, Vec3};
use lux_renderer::{Camera, Light, RenderConfig, Scene};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    #[serde(default)]
    pub camera: CameraDef,
    #[serde(default)]
    pub background: [f32; 3],
    #[serde(default)]
    pub lights: Vec<LightDef>,
    /// MTL files whose materials spheres and swept surfaces can name
    #[serde(default)]
    pub material_libraries: Vec<PathBuf>,
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    #[serde(default)]
    pub spheres: Vec<SphereDef>,
    /// OBJ files; each brings its own MTL libraries
    #[serde(default)]
    pub meshes: Vec<PathBuf>,
    #[serde(default)]
    pub swept: Vec<SweptDef>,
    #[serde(default)]
    pub render: RenderDef,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraDef {
    pub width: u32,
    pub height: u32,
    pub samples: u32,
    pub fovy: f32,
    pub f_number: f32,
    pub plane_dist: f32,
    pub focus_dist: f32,
    pub position: [f32; 3],
    pub orientation: Option<[f32; 4]>,
    /// Aim point; takes precedence over `orientation`
    pub look_at: Option<[f32; 3]>,
    pub up: [f32; 3],
}

impl Default for CameraDef {
    fn default() -> Self {
        let camera = Camera::default();
        Self {
            width: camera.width,
            height: camera.height,
            samples: camera.samples_per_pixel,
            fovy: camera.fovy,
            f_number: camera.f_number,
            plane_dist: camera.plane_dist,
            focus_dist: camera.focus_dist,
            position: camera.position.to_array(),
            orientation: None,
            look_at: None,
            up: [0.0, 0.0, 1.0],
        }
    }
}

impl CameraDef {
    fn to_camera(&self) -> Camera {
        let position = Vec3::from(self.position);
        let camera = Camera::new()
            .with_resolution(self.width, self.height)
            .with_samples(self.samples)
            .with_lens(self.fovy, self.f_number, self.plane_dist, self.focus_dist);

        match (self.look_at, self.orientation) {
            (Some(target), _) => camera.looking_at(position, Vec3::from(target), Vec3::from(self.up)),
            (None, Some(q)) => camera.with_pose(position, Quat::from_array(q)),
            (None, None) => camera.with_pose(position, Quat::IDENTITY),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum LightDef {
    Sun {
        color: [f32; 3],
        direction: [f32; 3],
    },
    Point {
        color: [f32; 3],
        position: [f32; 3],
    },
    Spot {
        color: [f32; 3],
        position: [f32; 3],
        direction: [f32; 3],
        /// Cone half-angle in radians
        half_angle: f32,
        #[serde(default = "default_exponent")]
        exponent: f32,
    },
}

fn default_exponent() -> f32 {
    1.0
}

impl From<&LightDef> for Light {
    fn from(def: &LightDef) -> Self {
        match *def {
            LightDef::Sun { color, direction } => Light::sun(color.into(), direction.into()),
            LightDef::Point { color, position } => Light::point(color.into(), position.into()),
            LightDef::Spot {
                color,
                position,
                direction,
                half_angle,
                exponent,
            } => Light::spot(
                color.into(),
                position.into(),
                direction.into(),
                half_angle,
                exponent,
            ),
        }
    }
}

/// Inline material, same fields as an MTL entry.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialDef {
    pub name: String,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub specular_exponent: f32,
    pub refractive: [f32; 3],
    pub ior: f32,
    pub illum: u8,
    pub diffuse_texture: Option<PathBuf>,
}

impl Default for MaterialDef {
    fn default() -> Self {
        let m = Material::default();
        Self {
            name: m.name,
            diffuse: m.diffuse.to_array(),
            specular: m.specular.to_array(),
            specular_exponent: m.specular_exponent,
            refractive: m.refractive.to_array(),
            ior: m.ior,
            illum: 2,
            diffuse_texture: None,
        }
    }
}

impl MaterialDef {
    fn to_material(&self, base_dir: &Path, textures: &mut TextureCache) -> Result<Material> {
        let mut material = Material::new(self.name.clone(), Color::from(self.diffuse))
            .with_specular(Color::from(self.specular), self.specular_exponent);
        material.refractive = Color::from(self.refractive);
        material.ior = self.ior;
        material.illum = lux_core::IllumModel::from_mtl(self.illum);

        if let Some(path) = &self.diffuse_texture {
            let path = base_dir.join(path);
            let texture = textures
                .load(&path)
                .with_context(|| format!("Failed to load texture {}", path.display()))?;
            material = material.with_texture(texture);
        }
        Ok(material)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SphereDef {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: String,
    pub orientation: Option<[f32; 4]>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweptDef {
    pub path: PathBuf,
    #[serde(default = "default_level")]
    pub level: u32,
    pub material: String,
}

fn default_level() -> u32 {
    2
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderDef {
    pub seed: u64,
    pub max_bounces: u32,
    pub bucket_size: u32,
}

impl Default for RenderDef {
    fn default() -> Self {
        let config = RenderConfig::default();
        Self {
            seed: config.seed,
            max_bounces: config.max_bounces,
            bucket_size: config.bucket_size,
        }
    }
}

impl SceneFile {
    /// Read and parse a scene file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse scene file {}", path.display()))
    }

    /// Load every referenced asset and assemble the scene.
    pub fn build(&self, base_dir: &Path) -> Result<(Scene, Camera, RenderConfig)> {
        let mut textures = TextureCache::new();
        let mut library: HashMap<String, Material> = HashMap::new();

        for path in &self.material_libraries {
            let path = base_dir.join(path);
            let materials = load_mtl(&path)
                .with_context(|| format!("Failed to load material library {}", path.display()))?;
            log::info!("Loaded {} materials from {}", materials.len(), path.display());
            library.extend(materials.into_iter().map(|m| (m.name.clone(), m)));
        }
        for def in &self.materials {
            library.insert(def.name.clone(), def.to_material(base_dir, &mut textures)?);
        }
        let lookup = |name: &str| -> Result<Material> {
            library
                .get(name)
                .cloned()
                .ok_or_else(|| LoadError::UnknownMaterial(name.to_string()).into())
        };

        let mut builder = Scene::builder();
        builder.background(Color::from(self.background));
        for light in &self.lights {
            builder.add_light(light.into());
        }

        for sphere in &self.spheres {
            let orientation = sphere.orientation.map_or(Quat::IDENTITY, Quat::from_array);
            builder.add_sphere(
                Vec3::from(sphere.center),
                sphere.radius,
                lookup(&sphere.material)?,
                orientation,
            );
        }

        for path in &self.meshes {
            let path = base_dir.join(path);
            let mesh = load_obj(&path)
                .with_context(|| format!("Failed to load mesh {}", path.display()))?;
            builder.add_mesh(mesh);
        }

        for swept in &self.swept {
            let path = base_dir.join(&swept.path);
            let mesh = load_swept_surface(&path, swept.level, lookup(&swept.material)?)
                .with_context(|| format!("Failed to build swept surface {}", path.display()))?;
            builder.add_mesh(mesh);
        }

        let scene = builder.build().context("Invalid scene")?;
        let config = RenderConfig {
            seed: self.render.seed,
            max_bounces: self.render.max_bounces,
            bucket_size: self.render.bucket_size,
            cancel: None,
        };
        Ok((scene, self.camera.to_camera(), config))
    }
}
