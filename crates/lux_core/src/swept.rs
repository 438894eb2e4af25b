//! Swept-surface mesh generation.
//!
//! A swept surface is a sequence of closed 2D cross-sections, each placed in
//! space by a scale, a rotation and a position. Cross-section curves and the
//! sweep path are both evaluated as cubic Bezier chains refined by repeated
//! de Casteljau halving, and the resulting grid of rings is stitched into
//! triangles.
//!
//! File format (whitespace separated, `#` starts a comment):
//!
//! ```text
//! BSPLINE | CATMULL_ROM
//! <section count> <control points per section>
//! # per section:
//! x0 y0 x1 y1 ...          control points
//! scale
//! angle ax ay az           rotation, radians about an axis
//! px py pz                 position
//! ```

use std::path::Path;

use lux_math::{Quat, Vec2, Vec3};

use crate::error::{LoadError, LoadResult};
use crate::material::Material;
use crate::mesh::Mesh;

/// Spline family used for the cross-section control points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveKind {
    BSpline,
    CatmullRom,
}

/// A cross-section placed along the sweep.
///
/// Control points live in the section's local XZ plane: point (x, y) maps to
/// local (x, 0, y) before scaling, rotation and translation.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub control_points: Vec<Vec2>,
    pub scale: f32,
    pub rotation: Quat,
    pub position: Vec3,
}

impl Default for Section {
    fn default() -> Self {
        Self {
            control_points: Vec::new(),
            scale: 1.0,
            rotation: Quat::IDENTITY,
            position: Vec3::ZERO,
        }
    }
}

impl Section {
    /// Halfway between two sections.
    fn midpoint(&self, next: &Section) -> Section {
        Section {
            control_points: self
                .control_points
                .iter()
                .zip(&next.control_points)
                .map(|(a, b)| (*a + *b) * 0.5)
                .collect(),
            scale: (self.scale + next.scale) * 0.5,
            rotation: self.rotation.slerp(next.rotation, 0.5),
            position: (self.position + next.position) * 0.5,
        }
    }

    /// Interior Catmull-Rom Bezier control next to `self`, tangent to left -> right.
    fn catmull_rom_control(&self, left: &Section, right: &Section) -> Section {
        Section {
            control_points: self
                .control_points
                .iter()
                .zip(left.control_points.iter().zip(&right.control_points))
                .map(|(p, (l, r))| (*r - *l) / 6.0 + *p)
                .collect(),
            scale: (right.scale - left.scale) / 6.0 + self.scale,
            rotation: left.rotation.slerp(right.rotation, 1.0 / 6.0) * left.rotation.inverse() * self.rotation,
            position: (right.position - left.position) / 6.0 + self.position,
        }
    }

    /// End-of-path Bezier control, a third of the way toward `toward`.
    fn end_control(&self, toward: &Section) -> Section {
        Section {
            control_points: self
                .control_points
                .iter()
                .zip(&toward.control_points)
                .map(|(p, t)| (*t - *p) / 3.0 + *p)
                .collect(),
            scale: (toward.scale - self.scale) / 3.0 + self.scale,
            rotation: self.rotation.slerp(toward.rotation, 1.0 / 3.0),
            position: (toward.position - self.position) / 3.0 + self.position,
        }
    }

    /// Same placement, cross-section refined `level` times.
    fn refined(&self, level: u32) -> Section {
        Section {
            control_points: subdivide(&self.control_points, level, |a, b| (*a + *b) * 0.5),
            ..self.clone()
        }
    }

    /// World position of control point `index`.
    fn global_position(&self, index: usize) -> Vec3 {
        let p = self.control_points[index];
        self.position + self.scale * (self.rotation * Vec3::new(p.x, 0.0, p.y))
    }
}

/// A parsed swept-surface description.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepDefinition {
    pub curve: CurveKind,
    /// Sections with their raw (spline) control points
    pub sections: Vec<Section>,
}

impl SweepDefinition {
    /// Parse the text format described in the module docs.
    pub fn parse(text: &str) -> LoadResult<Self> {
        let mut tokens = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(str::split_whitespace);

        let curve = match tokens.next() {
            Some("BSPLINE") => CurveKind::BSpline,
            Some("CATMULL_ROM") => CurveKind::CatmullRom,
            Some(other) => return Err(sweep_error(format!("unknown curve type '{}'", other))),
            None => return Err(sweep_error("empty file")),
        };

        let section_count = parse_count(tokens.next(), "section count")?;
        let point_count = parse_count(tokens.next(), "control point count")?;

        let values = tokens
            .map(|t| {
                t.parse::<f32>()
                    .map_err(|_| sweep_error(format!("invalid number '{}'", t)))
            })
            .collect::<LoadResult<Vec<f32>>>()?;

        let per_section = point_count
            .checked_mul(2)
            .and_then(|n| n.checked_add(8))
            .ok_or_else(|| sweep_error("section size overflows"))?;
        let expected = section_count
            .checked_mul(per_section)
            .ok_or_else(|| sweep_error("section size overflows"))?;
        if values.len() < expected {
            return Err(sweep_error(format!(
                "expected {} values for {} sections, found {}",
                expected,
                section_count,
                values.len()
            )));
        }

        let sections = values
            .chunks_exact(per_section)
            .take(section_count)
            .map(|v| {
                let (points, placement) = v.split_at(point_count * 2);
                let axis = Vec3::new(placement[2], placement[3], placement[4]);
                Section {
                    control_points: points.chunks_exact(2).map(|p| Vec2::new(p[0], p[1])).collect(),
                    scale: placement[0],
                    rotation: axis
                        .try_normalize()
                        .map_or(Quat::IDENTITY, |axis| Quat::from_axis_angle(axis, placement[1])),
                    position: Vec3::new(placement[5], placement[6], placement[7]),
                }
            })
            .collect();

        Ok(Self { curve, sections })
    }
}

/// Load and tessellate a swept-surface file.
pub fn load_swept_surface(path: impl AsRef<Path>, level: u32, material: Material) -> LoadResult<Mesh> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let definition = SweepDefinition::parse(&text)?;
    let mesh = sweep(&definition, level, material)?;

    log::info!(
        "Swept {}: {} sections -> {} triangles",
        path.display(),
        definition.sections.len(),
        mesh.triangle_count()
    );

    Ok(mesh)
}

/// Tessellate a swept surface at the given subdivision level.
///
/// Every face uses `material`, which becomes the mesh's only material. UVs are
/// zero.
pub fn sweep(definition: &SweepDefinition, level: u32, material: Material) -> LoadResult<Mesh> {
    let sections = &definition.sections;
    if sections.len() < 2 {
        return Err(sweep_error("at least two sections are required"));
    }
    let point_count = sections[0].control_points.len();
    if point_count < 3 {
        return Err(sweep_error("sections need at least three control points"));
    }
    if sections.iter().any(|s| s.control_points.len() != point_count) {
        return Err(sweep_error("sections have differing control point counts"));
    }

    // Cross-sections as refined closed polylines (last point repeats the first)
    let rendered: Vec<Section> = sections
        .iter()
        .map(|s| {
            let bezier = match definition.curve {
                CurveKind::BSpline => bspline_to_bezier(&s.control_points),
                CurveKind::CatmullRom => catmull_rom_to_bezier(&s.control_points),
            };
            Section {
                control_points: bezier,
                ..s.clone()
            }
            .refined(level)
        })
        .collect();

    // Sweep path as a Bezier chain of sections
    let last = rendered.len() - 1;
    let mut path = Vec::with_capacity(last * 3 + 1);
    for i in 0..last {
        path.push(rendered[i].clone());
        path.push(if i == 0 {
            rendered[i].end_control(&rendered[i + 1])
        } else {
            rendered[i].catmull_rom_control(&rendered[i - 1], &rendered[i + 1])
        });
        path.push(if i + 1 == last {
            rendered[i + 1].end_control(&rendered[i])
        } else {
            rendered[i + 1].catmull_rom_control(&rendered[i + 2], &rendered[i])
        });
    }
    path.push(rendered[last].clone());

    let rings = subdivide(&path, level, Section::midpoint);
    Ok(stitch(&rings, material))
}

/// Build the triangle soup from a sequence of closed rings.
fn stitch(rings: &[Section], material: Material) -> Mesh {
    let ring_count = rings.len();
    let n = rings[0].control_points.len() - 1;
    let at = |i: usize, j: usize| i * n + j % n;

    let vertices: Vec<Vec3> = rings
        .iter()
        .flat_map(|ring| (0..n).map(move |j| ring.global_position(j)))
        .collect();

    // One normal per quad, averaged from its two triangles
    let mut quad_normals = Vec::with_capacity((ring_count - 1) * n);
    for i in 0..ring_count - 1 {
        for j in 0..n {
            let p1 = vertices[at(i, j)];
            let p2 = vertices[at(i, j + 1)];
            let p3 = vertices[at(i + 1, j)];
            let p4 = vertices[at(i + 1, j + 1)];
            let a = (p3 - p4).cross(p3 - p1).normalize_or_zero();
            let b = (p2 - p1).cross(p2 - p4).normalize_or_zero();
            quad_normals.push((a + b).normalize_or_zero());
        }
    }

    let mut vertex_normals = Vec::with_capacity(vertices.len());
    for i in 0..ring_count {
        for j in 0..n {
            let mut normal = Vec3::ZERO;
            let mut count = 0.0;
            let prev = (j + n - 1) % n;
            if i != 0 {
                normal += quad_normals[(i - 1) * n + prev] + quad_normals[(i - 1) * n + j];
                count += 2.0;
            }
            if i != ring_count - 1 {
                normal += quad_normals[i * n + prev] + quad_normals[i * n + j];
                count += 2.0;
            }
            vertex_normals.push(normal / count);
        }
    }

    let mut mesh = Mesh::new();
    mesh.materials.push(material);
    for i in 0..ring_count - 1 {
        for j in 0..n {
            let quad = [
                [at(i, j), at(i + 1, j), at(i + 1, j + 1)],
                [at(i, j), at(i + 1, j + 1), at(i, j + 1)],
            ];
            for tri in quad {
                mesh.push_triangle(
                    tri.map(|k| vertices[k]),
                    tri.map(|k| vertex_normals[k]),
                    [Vec2::ZERO; 3],
                    0,
                );
            }
        }
    }
    mesh
}

/// Closed uniform cubic B-spline to a Bezier polygon of `3n + 1` points.
fn bspline_to_bezier(points: &[Vec2]) -> Vec<Vec2> {
    let n = points.len();
    let mut bezier = Vec::with_capacity(n * 3 + 1);
    for i in 0..n {
        let v0 = points[i];
        let v1 = points[(i + 1) % n];
        let v2 = points[(i + 2) % n];
        bezier.push((v0 + v1 * 4.0 + v2) / 6.0);
        bezier.push((v1 * 4.0 + v2 * 2.0) / 6.0);
        bezier.push((v1 * 2.0 + v2 * 4.0) / 6.0);
    }
    if let Some(first) = bezier.first().copied() {
        bezier.push(first);
    }
    bezier
}

/// Closed Catmull-Rom spline to a Bezier polygon of `3n + 1` points.
fn catmull_rom_to_bezier(points: &[Vec2]) -> Vec<Vec2> {
    let n = points.len();
    let mut bezier = Vec::with_capacity(n * 3 + 1);
    for i in 0..n {
        let v0 = points[i];
        let v1 = points[(i + 1) % n];
        let v2 = points[(i + 2) % n];
        let v3 = points[(i + 3) % n];
        bezier.push(v1);
        bezier.push((v2 - v0) / 6.0 + v1);
        bezier.push((v1 - v3) / 6.0 + v2);
    }
    if let Some(first) = bezier.first().copied() {
        bezier.push(first);
    }
    bezier
}

/// Refine a cubic Bezier chain (`3k + 1` controls) `level` times by halving
/// every segment, then keep only the on-curve points.
fn subdivide<T, F>(polygon: &[T], level: u32, mid: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> T,
{
    if polygon.len() < 4 {
        return polygon.to_vec();
    }

    let mut segment = polygon.to_vec();
    for _ in 0..level {
        let mut next = Vec::with_capacity(segment.len() * 2);
        for i in (0..segment.len() - 1).step_by(3) {
            let a0 = mid(&segment[i], &segment[i + 1]);
            let a1 = mid(&segment[i + 1], &segment[i + 2]);
            let a2 = mid(&segment[i + 2], &segment[i + 3]);
            let b0 = mid(&a0, &a1);
            let b1 = mid(&a1, &a2);
            let c0 = mid(&b0, &b1);
            next.push(segment[i].clone());
            next.extend([a0, b0, c0, b1, a2]);
        }
        next.push(segment[segment.len() - 1].clone());
        segment = next;
    }

    segment.into_iter().step_by(3).collect()
}

fn parse_count(token: Option<&str>, what: &str) -> LoadResult<usize> {
    token
        .and_then(|t| t.parse::<usize>().ok())
        .ok_or_else(|| sweep_error(format!("missing or invalid {}", what)))
}

fn sweep_error(message: impl Into<String>) -> LoadError {
    LoadError::Sweep(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A straight tube: identical rounded cross-sections stacked along Y.
    const TUBE: &str = "\
CATMULL_ROM
3 4
# section 0
1 0  0 1  -1 0  0 -1
1.0
0 0 0 1
0 0 0
# section 1
1 0  0 1  -1 0  0 -1
1.0
0 0 0 1
0 1 0
# section 2
1 0  0 1  -1 0  0 -1
1.0
0 0 0 1
0 2 0
";

    #[test]
    fn test_parse_definition() {
        let def = SweepDefinition::parse(TUBE).unwrap();
        assert_eq!(def.curve, CurveKind::CatmullRom);
        assert_eq!(def.sections.len(), 3);
        assert_eq!(def.sections[1].position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(def.sections[2].control_points[1], Vec2::new(0.0, 1.0));
        assert_eq!(def.sections[0].rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(SweepDefinition::parse(""), Err(LoadError::Sweep(_))));
        assert!(matches!(SweepDefinition::parse("NURBS 1 1"), Err(LoadError::Sweep(_))));
        assert!(matches!(SweepDefinition::parse("BSPLINE 2 3 1 2 3"), Err(LoadError::Sweep(_))));
        assert!(matches!(SweepDefinition::parse("BSPLINE x 3"), Err(LoadError::Sweep(_))));
    }

    #[test]
    fn test_parse_oversized_counts() {
        let huge_points = format!("BSPLINE 2 {} 1 2 3", usize::MAX / 2);
        assert!(matches!(SweepDefinition::parse(&huge_points), Err(LoadError::Sweep(_))));

        let huge_sections = format!("CATMULL_ROM {} 3 1 2 3", usize::MAX / 4);
        assert!(matches!(SweepDefinition::parse(&huge_sections), Err(LoadError::Sweep(_))));
    }

    #[test]
    fn test_bezier_conversion_is_closed() {
        let square = [
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(-1.0, 0.0),
            Vec2::new(0.0, -1.0),
        ];
        for bezier in [bspline_to_bezier(&square), catmull_rom_to_bezier(&square)] {
            assert_eq!(bezier.len(), 13);
            assert_eq!(bezier.first(), bezier.last());
        }
        // Catmull-Rom passes through its control points
        assert_eq!(catmull_rom_to_bezier(&square)[0], square[1]);
    }

    #[test]
    fn test_subdivide_counts() {
        let polygon: Vec<f32> = (0..7).map(|i| i as f32).collect();
        let mid = |a: &f32, b: &f32| (a + b) * 0.5;

        // No refinement keeps only segment endpoints
        assert_eq!(subdivide(&polygon, 0, mid), vec![0.0, 3.0, 6.0]);
        // Each level doubles the segment count
        assert_eq!(subdivide(&polygon, 1, mid).len(), 5);
        assert_eq!(subdivide(&polygon, 2, mid).len(), 9);
        // A straight line stays on the line
        assert_eq!(subdivide(&polygon, 1, mid)[1], 1.5);
    }

    #[test]
    fn test_sweep_tube() {
        let def = SweepDefinition::parse(TUBE).unwrap();
        let mesh = sweep(&def, 1, Material::default()).unwrap();

        // 4 points -> 8 per ring after one level; 3 sections -> 5 rings
        let rings = 5;
        let per_ring = 8;
        assert_eq!(mesh.triangle_count(), (rings - 1) * per_ring * 2);
        assert!(mesh.is_consistent());
        assert_eq!(mesh.materials.len(), 1);
        assert!(mesh.face_materials.iter().all(|&m| m == 0));

        // Tube spans y in [0, 2]
        let bounds = mesh.bounds();
        assert!(bounds.y.min.abs() < 1e-3);
        assert!((bounds.y.max - 2.0).abs() < 1e-3);

        // Normals are horizontal and point away from the axis
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let radial = Vec3::new(p.x, 0.0, p.z).normalize();
            assert!(n.y.abs() < 1e-3, "normal {:?}", n);
            assert!(radial.dot(n.normalize()).abs() > 0.5);
        }
    }

    #[test]
    fn test_sweep_requires_two_sections() {
        let def = SweepDefinition {
            curve: CurveKind::BSpline,
            sections: vec![Section {
                control_points: vec![Vec2::X, Vec2::Y, Vec2::NEG_X],
                ..Default::default()
            }],
        };
        assert!(matches!(sweep(&def, 1, Material::default()), Err(LoadError::Sweep(_))));
    }
}
