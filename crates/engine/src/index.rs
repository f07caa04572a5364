use brainmesh_mesh::{Bounds, IndexedMesh, Triangle, TriangleMesh, Vector3};
use cgmath::InnerSpace;

use crate::bvh::Bvh;
use crate::error::{Result, SamplingError};

// Barycentric slack so that segments through shared edges and corners are not lost
// between two neighboring triangles.
const BARYCENTRIC_EPSILON: f64 = 1e-9;

// Relative threshold below which a segment is treated as parallel to a triangle.
const PARALLEL_EPSILON: f64 = 1e-12;

#[inline(always)]
fn float_eq(f1: f64, f2: f64, tolerance: f64) -> bool {
    float_eq::float_eq!(f1, f2, abs <= tolerance)
}

/// Answers segment/surface intersection queries for a closed triangle mesh.
#[derive(Debug)]
pub struct SpatialMeshIndex {
    triangles: Vec<Triangle>,
    bvh: Bvh,
    bounds: Bounds,
    diagonal: f64,
}

impl SpatialMeshIndex {
    pub fn new(mesh: &IndexedMesh) -> Result<Self> {
        if let Some(facet) = mesh.invalid_facet() {
            return Err(SamplingError::InvalidMesh(format!(
                "facet {facet} references a vertex outside of the {} mesh points",
                mesh.vertex_count()
            )));
        }
        Self::from_triangles(mesh.triangles().collect())
    }

    pub fn from_triangles(triangles: Vec<Triangle>) -> Result<Self> {
        let Some(bvh) = Bvh::build(&triangles) else {
            return Err(SamplingError::InvalidMesh(
                "mesh has no triangles".to_string(),
            ));
        };
        let bounds = *bvh.bounds();
        let diagonal = bounds.diagonal();
        log::debug!(
            "indexed {} triangles, bounds {:?} -> {:?}, diagonal {}",
            triangles.len(),
            bounds.min,
            bounds.max,
            diagonal
        );
        Ok(Self {
            triangles,
            bvh,
            bounds,
            diagonal,
        })
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Length of the bounding box diagonal.
    pub fn diagonal(&self) -> f64 {
        self.diagonal
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns every point where the segment `a`-`b` crosses the surface, ordered from
    /// `a` towards `b`.
    ///
    /// A crossing that lands on an edge or a vertex is reported by every triangle
    /// sharing it; those duplicates are merged into a single point.
    pub fn intersect_segment(&self, a: Vector3, b: Vector3) -> Vec<Vector3> {
        let direction = b - a;
        let length = direction.magnitude();
        if length == 0.0 {
            return Vec::new();
        }

        let mut hits: Vec<f64> = Vec::new();
        self.bvh.visit_segment(a, direction, |i| {
            if let Some(t) = intersect_triangle(&self.triangles[i as usize], a, direction) {
                hits.push(t);
            }
        });
        hits.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));

        // Merge crossings closer than the index resolution, expressed in segment units.
        let merge_tolerance = 1e-9 * self.diagonal.max(1.0) / length;
        hits.dedup_by(|next, kept| float_eq(*next, *kept, merge_tolerance));

        hits.into_iter().map(|t| a + direction * t).collect()
    }
}

/// Möller–Trumbore test of the segment `origin + t * direction`, `t ∈ [0, 1]` against
/// one triangle. Returns the segment parameter of the crossing.
fn intersect_triangle(triangle: &Triangle, origin: Vector3, direction: Vector3) -> Option<f64> {
    let e1 = triangle.p1 - triangle.p0;
    let e2 = triangle.p2 - triangle.p0;
    let p = direction.cross(e2);
    let det = e1.dot(p);

    // |det| is |direction| * |e1 x e2| * cos(angle to the normal).
    let scale = direction.magnitude() * e1.cross(e2).magnitude();
    if scale == 0.0 || det.abs() <= PARALLEL_EPSILON * scale {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - triangle.p0;
    let u = s.dot(p) * inv_det;
    if !(-BARYCENTRIC_EPSILON..=1.0 + BARYCENTRIC_EPSILON).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = direction.dot(q) * inv_det;
    if v < -BARYCENTRIC_EPSILON || u + v > 1.0 + BARYCENTRIC_EPSILON {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    if (0.0..=1.0).contains(&t) {
        Some(t)
    } else {
        None
    }
}
