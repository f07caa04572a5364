mod geometry;
mod indexed_mesh;

pub use geometry::*;
pub use indexed_mesh::*;

/// A reasonable default mesh to select for unopinionated consumers.
pub type DefaultMesh = IndexedMesh;

pub trait TriangleMesh: Sized {
    type Triangles<'a>: Iterator<Item = Triangle>
    where
        Self: 'a;

    /// Creates a TriangleMesh from a list of triangles.
    ///
    /// # Arguments
    ///
    /// * `triangles` - A vector of the triangles of the mesh.
    fn from_triangles(triangles: Vec<Triangle>) -> Self;

    /// Returns the number of triangles that comprises this mesh.
    fn triangle_count(&self) -> usize;

    /// Iterates over the triangles of the mesh in facet order.
    fn triangles(&self) -> Self::Triangles<'_>;
}
