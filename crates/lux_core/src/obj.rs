//! Wavefront OBJ/MTL loading into triangle soups.
//!
//! Polygons are triangulated and every face is expanded into three standalone
//! vertices. Texture V coordinates are flipped so that V grows downward, matching
//! the texture row order.

use std::path::Path;

use lux_math::{Color, Vec2, Vec3};

use crate::error::{LoadError, LoadResult};
use crate::material::{IllumModel, Material};
use crate::mesh::{face_normal, Mesh};
use crate::texture::TextureCache;

/// Load an OBJ file (and its MTL libraries) as a triangle soup.
///
/// Faces without a material get a default material appended to the mesh.
pub fn load_obj(path: impl AsRef<Path>) -> LoadResult<Mesh> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        },
    )
    .map_err(|source| obj_error(path, source))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut cache = TextureCache::new();
    let mut mesh = Mesh::new();

    match materials {
        Ok(materials) => {
            for material in &materials {
                mesh.materials.push(convert_material(material, base_dir, &mut cache));
            }
        }
        Err(e) => log::warn!("{}: material library not loaded ({})", path.display(), e),
    }

    let mut default_material = None;
    let mut skipped = 0usize;

    for model in &models {
        let m = &model.mesh;
        let material = match m.material_id {
            Some(id) if id < mesh.materials.len() => id,
            _ => *default_material.get_or_insert_with(|| {
                mesh.materials.push(Material::default());
                mesh.materials.len() - 1
            }),
        };

        for face in m.indices.chunks_exact(3) {
            let idx = [face[0] as usize, face[1] as usize, face[2] as usize];

            let positions = match (
                vec3_at(&m.positions, idx[0]),
                vec3_at(&m.positions, idx[1]),
                vec3_at(&m.positions, idx[2]),
            ) {
                (Some(a), Some(b), Some(c)) => [a, b, c],
                _ => {
                    skipped += 1;
                    continue;
                }
            };

            let flat = face_normal(positions);
            let normals = idx.map(|i| vec3_at(&m.normals, i).unwrap_or(flat));
            let uvs = idx.map(|i| uv_at(&m.texcoords, i));

            mesh.push_triangle(positions, normals, uvs, material);
        }
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} faces with invalid indices", path.display(), skipped);
    }

    log::info!(
        "Loaded {}: {} triangles, {} materials, {} textures",
        path.display(),
        mesh.triangle_count(),
        mesh.materials.len(),
        cache.len()
    );

    Ok(mesh)
}

/// Load every material of an MTL library, in file order.
pub fn load_mtl(path: impl AsRef<Path>) -> LoadResult<Vec<Material>> {
    let path = path.as_ref();
    let (materials, _) = tobj::load_mtl(path).map_err(|source| obj_error(path, source))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let mut cache = TextureCache::new();

    Ok(materials
        .iter()
        .map(|m| convert_material(m, base_dir, &mut cache))
        .collect())
}

/// Map a parsed MTL entry onto a [`Material`], starting from the defaults.
fn convert_material(src: &tobj::Material, base_dir: &Path, cache: &mut TextureCache) -> Material {
    let mut mat = Material {
        name: src.name.clone(),
        ..Default::default()
    };

    if let Some(ka) = src.ambient {
        mat.ambient = Color::from_array(ka);
    }
    if let Some(kd) = src.diffuse {
        mat.diffuse = Color::from_array(kd);
    }
    if let Some(ks) = src.specular {
        mat.specular = Color::from_array(ks);
    }
    if let Some(ns) = src.shininess {
        mat.specular_exponent = ns;
    }
    if let Some(ni) = src.optical_density {
        mat.ior = ni;
    }
    if let Some(illum) = src.illumination_model {
        mat.illum = IllumModel::from_mtl(illum);
    }

    // Kr is not part of the MTL standard, tobj leaves it unparsed
    if let Some(kr) = src.unknown_param.get("Kr") {
        match parse_color(kr) {
            Some(kr) => mat.refractive = kr,
            None => log::warn!("Material {}: invalid Kr value '{}'", src.name, kr),
        }
    }

    if let Some(texture) = &src.diffuse_texture {
        let texture_path = base_dir.join(texture);
        match cache.load(&texture_path) {
            Ok(texture) => mat.diffuse_texture = Some(texture),
            Err(e) => log::warn!("Material {}: {}", src.name, e),
        }
    }

    mat
}

fn obj_error(path: &Path, source: tobj::LoadError) -> LoadError {
    LoadError::Obj {
        path: path.display().to_string(),
        source,
    }
}

fn vec3_at(data: &[f32], index: usize) -> Option<Vec3> {
    data.get(index * 3..index * 3 + 3).map(Vec3::from_slice)
}

fn uv_at(data: &[f32], index: usize) -> Vec2 {
    match data.get(index * 2..index * 2 + 2) {
        Some(uv) => Vec2::new(uv[0], 1.0 - uv[1]),
        None => Vec2::ZERO,
    }
}

fn parse_color(value: &str) -> Option<Color> {
    let channels = value
        .split_whitespace()
        .map(|s| s.parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()?;
    match channels.as_slice() {
        [r, g, b] => Some(Color::new(*r, *g, *b)),
        [v] => Some(Color::splat(*v)),
        _ => None,
    }
}
