use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::geometry::{Bounds, Triangle, Vector3};
use crate::TriangleMesh;

/// Maintains geometry for a single facet.
///
/// This type must be paired with a list of vertices. The points here are only indices into
/// another vector, which lets neighboring facets share a vertex. Connectivity questions
/// (which triangles touch) are answered by comparing these indices.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Facet {
    pub p0: u32,
    pub p1: u32,
    pub p2: u32,
}

impl Facet {
    pub fn new(p0: u32, p1: u32, p2: u32) -> Self {
        Self { p0, p1, p2 }
    }

    pub fn indices(&self) -> [u32; 3] {
        [self.p0, self.p1, self.p2]
    }
}

type PointKey = [OrderedFloat<f64>; 3];

fn point_key(p: &Vector3) -> PointKey {
    [OrderedFloat(p.x), OrderedFloat(p.y), OrderedFloat(p.z)]
}

/// A triangle mesh stored as a vertex list plus index triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    points: Vec<Vector3>,
    facets: Vec<Facet>,
}

impl IndexedMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mesh from raw parts. Indices are not checked here; see
    /// [`IndexedMesh::invalid_facet`].
    pub fn from_parts(points: Vec<Vector3>, facets: Vec<Facet>) -> Self {
        Self { points, facets }
    }

    pub fn points(&self) -> &[Vector3] {
        &self.points
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    pub fn add_point(&mut self, p: Vector3) -> u32 {
        self.points.push(p);
        (self.points.len() - 1) as u32
    }

    pub fn add_facet(&mut self, facet: Facet) {
        self.facets.push(facet);
    }

    /// Resolves the facet at `index` into its triangle geometry.
    pub fn triangle(&self, index: usize) -> Triangle {
        let f = &self.facets[index];
        Triangle {
            p0: self.points[f.p0 as usize],
            p1: self.points[f.p1 as usize],
            p2: self.points[f.p2 as usize],
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    /// Mean position of all vertices.
    pub fn centroid(&self) -> Option<Vector3> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + *p);
        Some(sum / self.points.len() as f64)
    }

    /// Returns the index of the first facet that references a vertex outside of the
    /// point list, if any.
    pub fn invalid_facet(&self) -> Option<usize> {
        let n = self.points.len() as u32;
        self.facets
            .iter()
            .position(|f| f.indices().iter().any(|&i| i >= n))
    }
}

impl TriangleMesh for IndexedMesh {
    /// Builds the mesh by welding identical positions into a single vertex.
    ///
    /// Triangle soups (for example STL files) repeat every shared corner once per
    /// triangle. Welding on exact coordinate equality is enough for exported meshes
    /// where neighbors were written from the same source vertex.
    fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let mut lookup: HashMap<PointKey, u32> = HashMap::new();
        let mut points = Vec::new();
        let mut weld = |p: Vector3| -> u32 {
            *lookup.entry(point_key(&p)).or_insert_with(|| {
                points.push(p);
                (points.len() - 1) as u32
            })
        };
        let facets = triangles
            .iter()
            .map(|t| Facet {
                p0: weld(t.p0),
                p1: weld(t.p1),
                p2: weld(t.p2),
            })
            .collect();
        Self { points, facets }
    }

    fn triangle_count(&self) -> usize {
        self.facets.len()
    }

    type Triangles<'a> = Triangles<'a>;

    fn triangles(&self) -> Triangles<'_> {
        Triangles {
            mesh: self,
            next: 0,
        }
    }
}

pub struct Triangles<'a> {
    mesh: &'a IndexedMesh,
    next: usize,
}

impl<'a> Iterator for Triangles<'a> {
    type Item = Triangle;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.mesh.facets.len() {
            return None;
        }
        let t = self.mesh.triangle(self.next);
        self.next += 1;
        Some(t)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.mesh.facets.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Triangles<'a> {}
