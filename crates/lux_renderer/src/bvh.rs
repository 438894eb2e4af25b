//! Bounding Volume Hierarchy (BVH) over a triangle soup.
//!
//! Median split on the longest axis; leaves keep copies of their triangles'
//! vertices along with the original face indices so that traversal never
//! touches the scene's vertex arrays.

use lux_math::{Aabb, Interval, Ray, Vec3};

/// Maximum triangles per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 3;

/// BVH node - either a branch with two children or a leaf with triangles.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of triangles.
    Leaf {
        triangles: Vec<[Vec3; 3]>,
        faces: Vec<usize>,
        bbox: Aabb,
    },
}

/// A triangle whose leaf box the ray crossed. Not necessarily a hit.
#[derive(Debug, Clone, Copy)]
pub struct CandidateTriangle<'a> {
    pub face: usize,
    pub vertices: &'a [Vec3; 3],
}

impl BvhNode {
    /// Create a BVH from a flat vertex list, three vertices per triangle.
    ///
    /// Trailing vertices that do not form a whole triangle are ignored. An
    /// empty list produces an empty leaf.
    pub fn new(vertices: &[Vec3]) -> Self {
        let triangles: Vec<[Vec3; 3]> = vertices
            .chunks_exact(3)
            .map(|v| [v[0], v[1], v[2]])
            .collect();
        let faces = (0..triangles.len()).collect();
        Self::build(triangles, faces)
    }

    /// Recursive construction.
    ///
    /// Sort by centroid on the longest axis of the node's box and split the
    /// sorted order in half. The split is by position, so triangles sharing a
    /// centroid still end up on both sides.
    fn build(triangles: Vec<[Vec3; 3]>, faces: Vec<usize>) -> Self {
        let bbox = Aabb::from_vertices(triangles.iter().flatten());

        if triangles.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                triangles,
                faces,
                bbox,
            };
        }

        let axis = bbox.longest_axis();
        let mut order: Vec<(f32, usize)> = triangles
            .iter()
            .enumerate()
            .map(|(i, t)| ((t[0][axis] + t[1][axis] + t[2][axis]) / 3.0, i))
            .collect();
        order.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mid = order.len() / 2;
        let (left_order, right_order) = order.split_at(mid);
        let gather = |part: &[(f32, usize)]| -> (Vec<[Vec3; 3]>, Vec<usize>) {
            part.iter().map(|&(_, i)| (triangles[i], faces[i])).unzip()
        };
        let (left_tris, left_faces) = gather(left_order);
        let (right_tris, right_faces) = gather(right_order);

        BvhNode::Branch {
            left: Box::new(Self::build(left_tris, left_faces)),
            right: Box::new(Self::build(right_tris, right_faces)),
            bbox,
        }
    }

    /// Bounding box of everything below this node.
    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Longest root-to-leaf path, counting the root as 1.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Call `visit` for every triangle stored in a leaf whose box the ray hits.
    ///
    /// Iterative depth-first traversal with an explicit stack. Candidates
    /// arrive in no particular order.
    pub fn visit_candidates<'a, F>(&'a self, ray: &Ray, mut visit: F)
    where
        F: FnMut(CandidateTriangle<'a>),
    {
        let mut stack: Vec<&'a BvhNode> = Vec::new();
        let mut current = self;

        loop {
            if current.bounding_box().hit(ray, Interval::FORWARD) {
                match current {
                    BvhNode::Leaf { triangles, faces, .. } => {
                        for (vertices, &face) in triangles.iter().zip(faces) {
                            visit(CandidateTriangle { face, vertices });
                        }
                    }
                    BvhNode::Branch { left, right, .. } => {
                        stack.push(left.as_ref());
                        current = right.as_ref();
                        continue;
                    }
                }
            }

            match stack.pop() {
                Some(node) => current = node,
                None => break,
            }
        }
    }

    /// Collect the candidate triangles for a ray.
    pub fn candidates(&self, ray: &Ray) -> Vec<CandidateTriangle<'_>> {
        let mut out = Vec::new();
        self.visit_candidates(ray, |c| out.push(c));
        out
    }
}
