//! Procedural meshes shared by the test suites.

use std::f64::consts::PI;

use brainmesh_mesh::{Facet, IndexedMesh, TriangleMesh, Vector3};
use byteorder::{LittleEndian, WriteBytesExt};

// Outward facing (counter-clockwise) facets of a box whose corners are numbered
// with bit 0 = x, bit 1 = y, bit 2 = z.
const BOX_FACETS: [[u32; 3]; 12] = [
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
];

fn push_box(mesh: &mut IndexedMesh, min: Vector3, size: f64) {
    let base = mesh.vertex_count() as u32;
    for corner in 0..8u32 {
        mesh.add_point(Vector3::new(
            min.x + if corner & 1 != 0 { size } else { 0.0 },
            min.y + if corner & 2 != 0 { size } else { 0.0 },
            min.z + if corner & 4 != 0 { size } else { 0.0 },
        ));
    }
    for [a, b, c] in BOX_FACETS {
        mesh.add_facet(Facet::new(base + a, base + b, base + c));
    }
}

/// An axis aligned cube with 8 vertices and 12 triangles.
pub fn cube(min: Vector3, size: f64) -> IndexedMesh {
    let mut mesh = IndexedMesh::new();
    push_box(&mut mesh, min, size);
    mesh
}

/// The unit cube spanning [0, 1] on every axis.
pub fn unit_cube() -> IndexedMesh {
    cube(Vector3::new(0.0, 0.0, 0.0), 1.0)
}

/// Two disjoint unit cubes, the second one shifted by `gap + 1` along x. The facets
/// of the two cubes are interleaved so that component extraction cannot rely on
/// facet order.
pub fn two_cubes(gap: f64) -> IndexedMesh {
    let left = cube(Vector3::new(0.0, 0.0, 0.0), 1.0);
    let right = cube(Vector3::new(1.0 + gap, 0.0, 0.0), 1.0);
    let mut points = left.points().to_vec();
    points.extend_from_slice(right.points());
    let mut facets = Vec::new();
    for (a, b) in left.facets().iter().zip(right.facets()) {
        facets.push(*a);
        facets.push(Facet::new(b.p0 + 8, b.p1 + 8, b.p2 + 8));
    }
    IndexedMesh::from_parts(points, facets)
}

/// A closed UV sphere centered on `center`.
///
/// The poles are single vertices; `rings` is the number of latitude bands and
/// `segments` the number of longitude slices.
pub fn uv_sphere(center: Vector3, radius: f64, rings: u32, segments: u32) -> IndexedMesh {
    assert!(rings >= 2 && segments >= 3);
    let mut mesh = IndexedMesh::new();
    let north = mesh.add_point(center + Vector3::new(0.0, 0.0, radius));
    for ring in 1..rings {
        let theta = PI * ring as f64 / rings as f64;
        for segment in 0..segments {
            let phi = 2.0 * PI * segment as f64 / segments as f64;
            mesh.add_point(
                center
                    + Vector3::new(
                        radius * theta.sin() * phi.cos(),
                        radius * theta.sin() * phi.sin(),
                        radius * theta.cos(),
                    ),
            );
        }
    }
    let south = mesh.add_point(center - Vector3::new(0.0, 0.0, radius));
    let ring_start = |ring: u32| 1 + (ring - 1) * segments;

    for s in 0..segments {
        let next = (s + 1) % segments;
        mesh.add_facet(Facet::new(north, ring_start(1) + s, ring_start(1) + next));
    }
    for ring in 1..rings - 1 {
        for s in 0..segments {
            let next = (s + 1) % segments;
            let a = ring_start(ring) + s;
            let b = ring_start(ring) + next;
            let c = ring_start(ring + 1) + s;
            let d = ring_start(ring + 1) + next;
            mesh.add_facet(Facet::new(a, c, d));
            mesh.add_facet(Facet::new(a, d, b));
        }
    }
    let last = ring_start(rings - 1);
    for s in 0..segments {
        let next = (s + 1) % segments;
        mesh.add_facet(Facet::new(south, last + next, last + s));
    }
    mesh
}

/// A sphere of radius 50 around the origin, the scale of a small brain region.
pub fn region_sphere() -> IndexedMesh {
    uv_sphere(Vector3::new(0.0, 0.0, 0.0), 50.0, 16, 24)
}

/// Encodes a mesh as a binary STL file.
pub fn stl_bytes<M: TriangleMesh>(mesh: &M) -> Vec<u8> {
    let mut out = vec![0u8; 80];
    out.write_u32::<LittleEndian>(mesh.triangle_count() as u32)
        .unwrap();
    for t in mesh.triangles() {
        for _ in 0..3 {
            out.write_f32::<LittleEndian>(0.0).unwrap();
        }
        for p in [t.p0, t.p1, t.p2] {
            out.write_f32::<LittleEndian>(p.x as f32).unwrap();
            out.write_f32::<LittleEndian>(p.y as f32).unwrap();
            out.write_f32::<LittleEndian>(p.z as f32).unwrap();
        }
        out.write_u16::<LittleEndian>(0).unwrap();
    }
    out
}
