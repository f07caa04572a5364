use std::io::{ErrorKind, Write};

use brainmesh_mesh::{DefaultMesh, IndexedMesh, TriangleMesh};
use brainmesh_stl::StlReader;
use brainmesh_test_data::{region_sphere, stl_bytes, two_cubes, unit_cube};

#[test]
fn parse_cube() {
    let bytes = stl_bytes(&unit_cube());
    let mesh = brainmesh_stl::parse_stl::<DefaultMesh>(&bytes).unwrap();
    // Expect 12 triangles (2 per face x 6 faces) sharing 8 welded vertices.
    assert_eq!(12, mesh.triangle_count());
    assert_eq!(8, mesh.vertex_count());
    assert_eq!(
        unit_cube().triangles().collect::<Vec<_>>(),
        mesh.triangles().collect::<Vec<_>>()
    );
}

#[test]
fn read_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&stl_bytes(&two_cubes(1.0))).unwrap();
    file.flush().unwrap();

    let mesh: IndexedMesh = brainmesh_stl::read_stl(file.path()).unwrap();
    assert_eq!(24, mesh.triangle_count());
    assert_eq!(16, mesh.vertex_count());
}

#[test]
fn reader_trait() {
    let bytes = stl_bytes(&region_sphere());
    let mut cursor = std::io::Cursor::new(bytes);
    let mesh: IndexedMesh = cursor.read_stl().unwrap();
    assert_eq!(720, mesh.triangle_count());
    assert_eq!(region_sphere().vertex_count(), mesh.vertex_count());
    // f32 storage keeps positions within single precision of the source.
    for p in mesh.points() {
        let r = (p.x * p.x + p.y * p.y + p.z * p.z).sqrt();
        assert!((r - 50.0).abs() < 1e-4);
    }
}

#[test]
fn solid_header_with_binary_body_is_accepted() {
    let mut bytes = stl_bytes(&unit_cube());
    bytes[..5].copy_from_slice(b"solid");
    let mesh = brainmesh_stl::parse_stl::<DefaultMesh>(&bytes).unwrap();
    assert_eq!(12, mesh.triangle_count());
}

#[test]
fn rejects_ascii() {
    let ascii = "solid cube\n\
                 facet normal 0 0 -1\n\
                 outer loop\n\
                 vertex 0 0 0\n\
                 vertex 0 1 0\n\
                 vertex 1 1 0\n\
                 endloop\n\
                 endfacet\n\
                 endsolid cube\n";
    let err = brainmesh_stl::parse_stl::<DefaultMesh>(ascii.as_bytes()).unwrap_err();
    assert_eq!(ErrorKind::InvalidData, err.kind());
    assert!(err.to_string().contains("ASCII"));
}

#[test]
fn rejects_truncated_files() {
    let bytes = stl_bytes(&unit_cube());
    let err = brainmesh_stl::parse_stl::<DefaultMesh>(&bytes[..bytes.len() - 10]).unwrap_err();
    assert_eq!(ErrorKind::InvalidData, err.kind());

    let err = brainmesh_stl::parse_stl::<DefaultMesh>(&bytes[..40]).unwrap_err();
    assert_eq!(ErrorKind::InvalidData, err.kind());
}

#[test]
fn empty_solid() {
    let bytes = stl_bytes(&IndexedMesh::new());
    let mesh = brainmesh_stl::parse_stl::<DefaultMesh>(&bytes).unwrap();
    assert!(mesh.is_empty());
    assert!(mesh.bounds().is_none());
}
