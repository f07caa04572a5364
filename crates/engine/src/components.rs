//! Splitting a mesh into its connected pieces.
//!
//! A single region mesh sometimes holds both halves of a bilateral structure as two
//! disjoint shells. Extracting the shells lets each half be sampled on its own.

use std::collections::HashMap;

use brainmesh_mesh::{Axis, Facet, IndexedMesh, TriangleMesh};

use crate::error::{Result, SamplingError};

/// A two-component split is reported as unbalanced when one side has more than this
/// many times the triangles of the other.
pub const UNBALANCED_COMPONENT_RATIO: usize = 10;

/// Disjoint sets over vertex indices.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression.
        let mut x = x;
        while self.parent[x] != root {
            let next = self.parent[x];
            self.parent[x] = root;
            x = next;
        }
        root
    }

    fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        match self.rank[root_x].cmp(&self.rank[root_y]) {
            std::cmp::Ordering::Less => self.parent[root_x] = root_y,
            std::cmp::Ordering::Greater => self.parent[root_y] = root_x,
            std::cmp::Ordering::Equal => {
                self.parent[root_y] = root_x;
                self.rank[root_x] += 1;
            }
        }
    }
}

/// Splits `mesh` into its connected components.
///
/// Vertices at identical positions are welded first, so triangles that touch only
/// through duplicated vertices still end up in the same component. Components are
/// returned in the order their first facet appears in `mesh`; each one holds just its
/// own triangles and the vertices they use.
pub fn extract_components(mesh: &IndexedMesh) -> Result<Vec<IndexedMesh>> {
    if let Some(facet) = mesh.invalid_facet() {
        return Err(SamplingError::InvalidMesh(format!(
            "facet {facet} references a vertex outside of the {} mesh points",
            mesh.vertex_count()
        )));
    }
    let welded = IndexedMesh::from_triangles(mesh.triangles().collect());

    let mut sets = UnionFind::new(welded.vertex_count());
    for f in welded.facets() {
        sets.union(f.p0 as usize, f.p1 as usize);
        sets.union(f.p0 as usize, f.p2 as usize);
    }

    let mut component_of_root: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<IndexedMesh> = Vec::new();
    // Index of each welded vertex inside its component's mesh.
    let mut local: Vec<Option<u32>> = vec![None; welded.vertex_count()];

    for f in welded.facets() {
        let root = sets.find(f.p0 as usize);
        let c = *component_of_root.entry(root).or_insert_with(|| {
            components.push(IndexedMesh::new());
            components.len() - 1
        });
        let component = &mut components[c];
        let mut remap = |v: u32| -> u32 {
            *local[v as usize]
                .get_or_insert_with(|| component.add_point(welded.points()[v as usize]))
        };
        let facet = Facet::new(remap(f.p0), remap(f.p1), remap(f.p2));
        component.add_facet(facet);
    }

    log::debug!(
        "{} triangles form {} connected component(s)",
        mesh.triangle_count(),
        components.len()
    );
    Ok(components)
}

/// Orders two meshes by the mean coordinate of their vertices along `axis` and returns
/// them as `(lower, higher)`. Ties return `(b, a)`.
pub fn order_by_axis(axis: Axis, a: IndexedMesh, b: IndexedMesh) -> (IndexedMesh, IndexedMesh) {
    let coord = |m: &IndexedMesh| m.centroid().map_or(f64::NAN, |c| c[axis.index()]);
    if coord(&a) < coord(&b) {
        (a, b)
    } else {
        (b, a)
    }
}

/// How a region mesh decomposes for bilateral sampling.
#[derive(Debug, Clone, PartialEq)]
pub enum BilateralSplit {
    /// One connected shell. Sides are found by splitting it at its midpoint.
    Single(IndexedMesh),
    /// Two shells, ordered along the split axis.
    Pair {
        lower: IndexedMesh,
        higher: IndexedMesh,
    },
}

/// Extracts the components of `mesh` and arranges them for bilateral sampling.
///
/// Meshes with more than two components are rejected; there is no rule for assigning
/// the extra pieces to a side.
pub fn split_bilateral(mesh: &IndexedMesh, axis: Axis) -> Result<BilateralSplit> {
    let mut components = extract_components(mesh)?;
    match components.len() {
        0 => Err(SamplingError::InvalidMesh("mesh has no triangles".to_string())),
        1 => Ok(BilateralSplit::Single(components.remove(0))),
        2 => {
            let b = components.remove(1);
            let a = components.remove(0);
            let (small, large) = {
                let (na, nb) = (a.triangle_count(), b.triangle_count());
                (na.min(nb), na.max(nb))
            };
            if large > small * UNBALANCED_COMPONENT_RATIO {
                log::warn!(
                    "components are unbalanced: {} vs {} triangles, the mesh may not be two halves",
                    small,
                    large
                );
            }
            let (lower, higher) = order_by_axis(axis, a, b);
            Ok(BilateralSplit::Pair { lower, higher })
        }
        n => Err(SamplingError::TooManyComponents(n)),
    }
}

#[cfg(test)]
mod tests {
    use brainmesh_mesh::{Triangle, Vector3};
    use brainmesh_test_data::{cube, region_sphere, two_cubes, unit_cube};

    use super::*;

    fn merge(meshes: &[IndexedMesh]) -> IndexedMesh {
        let triangles: Vec<Triangle> = meshes.iter().flat_map(|m| m.triangles()).collect();
        IndexedMesh::from_triangles(triangles)
    }

    #[test]
    fn single_cube_is_one_component() {
        let components = extract_components(&unit_cube()).unwrap();
        assert_eq!(1, components.len());
        assert_eq!(8, components[0].vertex_count());
        assert_eq!(12, components[0].triangle_count());
        assert_eq!(None, components[0].invalid_facet());
    }

    #[test]
    fn two_cubes_are_separated() {
        let mesh = two_cubes(1.0);
        let components = extract_components(&mesh).unwrap();
        assert_eq!(2, components.len());

        for c in &components {
            assert_eq!(8, c.vertex_count());
            assert_eq!(12, c.triangle_count());
            assert_eq!(None, c.invalid_facet());
        }
        // Discovery order: facet 0 belongs to the cube at the origin.
        assert_eq!(Vector3::new(0.5, 0.5, 0.5), components[0].centroid().unwrap());
        assert_eq!(Vector3::new(2.5, 0.5, 0.5), components[1].centroid().unwrap());

        // Every triangle lands in exactly one component.
        let mut original: Vec<Triangle> = mesh.triangles().collect();
        let mut extracted: Vec<Triangle> =
            components.iter().flat_map(|c| c.triangles()).collect();
        let key = |t: &Triangle| format!("{:?}", t);
        original.sort_by_key(key);
        extracted.sort_by_key(key);
        assert_eq!(original, extracted);
    }

    #[test]
    fn duplicated_vertices_are_welded() {
        // Every triangle of the cube gets its own three vertices.
        let cube = unit_cube();
        let mut points = Vec::new();
        let mut facets = Vec::new();
        for t in cube.triangles() {
            let base = points.len() as u32;
            points.extend([t.p0, t.p1, t.p2]);
            facets.push(Facet::new(base, base + 1, base + 2));
        }
        let soup = IndexedMesh::from_parts(points, facets);
        assert_eq!(36, soup.vertex_count());

        let components = extract_components(&soup).unwrap();
        assert_eq!(1, components.len());
        assert_eq!(8, components[0].vertex_count());
    }

    #[test]
    fn touching_cubes_form_one_component() {
        let components = extract_components(&two_cubes(0.0)).unwrap();
        assert_eq!(1, components.len());
        assert_eq!(24, components[0].triangle_count());
    }

    #[test]
    fn invalid_and_empty_meshes() {
        let dangling = IndexedMesh::from_parts(vec![], vec![Facet::new(0, 1, 2)]);
        assert!(matches!(
            extract_components(&dangling),
            Err(SamplingError::InvalidMesh(_))
        ));
        assert!(extract_components(&IndexedMesh::new()).unwrap().is_empty());
        assert!(matches!(
            split_bilateral(&IndexedMesh::new(), Axis::X),
            Err(SamplingError::InvalidMesh(_))
        ));
    }

    #[test]
    fn ordering_along_an_axis() {
        let a = cube(Vector3::new(5.0, 0.0, 0.0), 1.0);
        let b = cube(Vector3::new(-5.0, 0.0, 0.0), 1.0);
        let (lower, higher) = order_by_axis(Axis::X, a.clone(), b.clone());
        assert_eq!(b, lower);
        assert_eq!(a, higher);

        let (lower, higher) = order_by_axis(Axis::X, b.clone(), a.clone());
        assert_eq!(b, lower);
        assert_eq!(a, higher);

        // Equal on the axis: the second argument comes first.
        let (lower, higher) = order_by_axis(Axis::Y, a.clone(), b.clone());
        assert_eq!(b, lower);
        assert_eq!(a, higher);
    }

    #[test]
    fn bilateral_splits() {
        match split_bilateral(&unit_cube(), Axis::X).unwrap() {
            BilateralSplit::Single(m) => assert_eq!(12, m.triangle_count()),
            other => panic!("expected a single component, got {other:?}"),
        }

        match split_bilateral(&two_cubes(2.0), Axis::X).unwrap() {
            BilateralSplit::Pair { lower, higher } => {
                assert!(lower.centroid().unwrap().x < higher.centroid().unwrap().x);
            }
            other => panic!("expected a pair, got {other:?}"),
        }

        let three = merge(&[
            cube(Vector3::new(0.0, 0.0, 0.0), 1.0),
            cube(Vector3::new(3.0, 0.0, 0.0), 1.0),
            cube(Vector3::new(6.0, 0.0, 0.0), 1.0),
        ]);
        assert_eq!(
            Err(SamplingError::TooManyComponents(3)),
            split_bilateral(&three, Axis::X)
        );
    }

    #[test]
    fn unbalanced_pair_is_still_split() {
        // 12 triangles against the sphere's 720.
        let mesh = merge(&[
            region_sphere(),
            cube(Vector3::new(100.0, 0.0, 0.0), 1.0),
        ]);
        match split_bilateral(&mesh, Axis::X).unwrap() {
            BilateralSplit::Pair { lower, higher } => {
                assert_eq!(720, lower.triangle_count());
                assert_eq!(12, higher.triangle_count());
            }
            other => panic!("expected a pair, got {other:?}"),
        }
    }
}
