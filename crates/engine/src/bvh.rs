//! Bounding volume hierarchy over the triangles of a mesh.
//!
//! The hierarchy only answers "which triangles might a segment touch"; the exact
//! segment/triangle test lives with the caller.

use brainmesh_mesh::{Bounds, Triangle, Vector3};
use smallvec::SmallVec;

/// Triangles stored per leaf before a node is split.
const MAX_LEAF_SIZE: usize = 8;

#[derive(Debug)]
enum BvhNode {
    Leaf {
        bounds: Bounds,
        triangles: SmallVec<[u32; MAX_LEAF_SIZE]>,
    },
    Internal {
        bounds: Bounds,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn bounds(&self) -> &Bounds {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Internal { bounds, .. } => bounds,
        }
    }
}

#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
    // Slack added to every box in the overlap test so that segments grazing a face
    // (for example running exactly along a cube edge) still reach its triangles.
    tolerance: f64,
}

impl Bvh {
    /// Builds the hierarchy, or returns `None` if there are no triangles.
    pub fn build(triangles: &[Triangle]) -> Option<Self> {
        if triangles.is_empty() {
            return None;
        }
        let items: Vec<(u32, Bounds, Vector3)> = triangles
            .iter()
            .enumerate()
            .map(|(i, t)| (i as u32, t.bounds(), t.centroid()))
            .collect();
        let indices: Vec<usize> = (0..items.len()).collect();
        let root = Self::build_recursive(&items, indices);
        let tolerance = 1e-9 * root.bounds().diagonal().max(1.0);
        Some(Self { root, tolerance })
    }

    fn build_recursive(items: &[(u32, Bounds, Vector3)], mut indices: Vec<usize>) -> BvhNode {
        let mut bounds = items[indices[0]].1;
        for &i in &indices[1..] {
            bounds.expand(&items[i].1);
        }

        if indices.len() <= MAX_LEAF_SIZE {
            return BvhNode::Leaf {
                bounds,
                triangles: indices.iter().map(|&i| items[i].0).collect(),
            };
        }

        // Median split of the triangle centroids along the longest axis of the node.
        let axis = bounds.longest_axis().index();
        indices.sort_by(|&a, &b| {
            items[a].2[axis]
                .partial_cmp(&items[b].2[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let right_indices = indices.split_off(indices.len() / 2);

        BvhNode::Internal {
            bounds,
            left: Box::new(Self::build_recursive(items, indices)),
            right: Box::new(Self::build_recursive(items, right_indices)),
        }
    }

    pub fn bounds(&self) -> &Bounds {
        self.root.bounds()
    }

    /// Calls `visit` with the index of every triangle whose box the segment
    /// `origin + t * direction`, `t ∈ [0, 1]` passes through.
    pub fn visit_segment<F: FnMut(u32)>(&self, origin: Vector3, direction: Vector3, mut visit: F) {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if !segment_overlaps(node.bounds(), origin, direction, self.tolerance) {
                continue;
            }
            match node {
                BvhNode::Leaf { triangles, .. } => triangles.iter().for_each(|&t| visit(t)),
                BvhNode::Internal { left, right, .. } => {
                    stack.push(left.as_ref());
                    stack.push(right.as_ref());
                }
            }
        }
    }
}

// Slab test clipped to the segment parameter range [0, 1].
fn segment_overlaps(bounds: &Bounds, origin: Vector3, direction: Vector3, tolerance: f64) -> bool {
    let mut t_min = 0.0f64;
    let mut t_max = 1.0f64;
    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let lo = bounds.min[axis] - tolerance;
        let hi = bounds.max[axis] + tolerance;
        if d == 0.0 {
            if o < lo || o > hi {
                return false;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (t0, t1) = {
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        };
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return false;
        }
    }
    true
}
