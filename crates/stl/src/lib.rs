use byteorder::{LittleEndian, ReadBytesExt};
use brainmesh_mesh::{Triangle, TriangleMesh, Vector3};
use std::io::{Error, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

const HEADER_LEN: u64 = 80;
// Normal, three vertices and the attribute byte count.
const TRIANGLE_LEN: u64 = 12 * 4 + 2;

fn invalid(message: String) -> Error {
    Error::new(ErrorKind::InvalidData, message)
}

fn read_vertex<T: Read>(f: &mut T) -> std::io::Result<Vector3> {
    Ok(Vector3 {
        x: f.read_f32::<LittleEndian>()? as f64,
        y: f.read_f32::<LittleEndian>()? as f64,
        z: f.read_f32::<LittleEndian>()? as f64,
    })
}

fn read_binary<M: TriangleMesh, T: Read + Seek>(f: &mut T) -> std::io::Result<M> {
    let len = f.seek(SeekFrom::End(0))?;
    f.seek(SeekFrom::Start(0))?;

    // Binary files start with an 80 byte header. There is no defined structure for this
    // header, but ASCII files always begin with "solid". Some binary exporters write
    // "solid" here too, so the file size decides.
    let mut header = [0u8; HEADER_LEN as usize];
    f.read_exact(&mut header).map_err(|_| {
        invalid(format!("{len} bytes is too short for a binary STL header"))
    })?;

    // Immediately following the header is an unsigned 32-bit integer that indicates the
    // number of triangles that follow.
    let n_triangles = f
        .read_u32::<LittleEndian>()
        .map_err(|_| invalid("missing triangle count".to_string()))?;
    let expected = HEADER_LEN + 4 + n_triangles as u64 * TRIANGLE_LEN;
    if len < expected {
        if header.starts_with(b"solid") {
            return Err(invalid("ASCII STL files are not supported".to_string()));
        }
        return Err(invalid(format!(
            "file declares {n_triangles} triangles ({expected} bytes) but is {len} bytes long"
        )));
    }
    if len > expected {
        log::warn!("ignoring {} trailing bytes after the last triangle", len - expected);
    }

    let mut data = Vec::<Triangle>::with_capacity(n_triangles as usize);
    for _ in 0..n_triangles {
        // Each triangle is specified by a normal vector followed by 3 vertices. Vertices
        // are listed counter-clockwise, so the normal is redundant and often (0, 0, 0).
        let _normal = read_vertex(f)?;
        data.push(Triangle {
            p0: read_vertex(f)?,
            p1: read_vertex(f)?,
            p2: read_vertex(f)?,
        });
        // After the triangle geometry there is a 2-byte unsigned integer called the
        // "attribute byte count". There is no standard structure of this field, but
        // some applications use this for color data.
        let _attribute_byte_count = f.read_u16::<LittleEndian>()?;
    }
    Ok(M::from_triangles(data))
}

pub fn read_stl<M: TriangleMesh, P: AsRef<Path>>(p: P) -> std::io::Result<M> {
    let mut f = std::fs::File::open(p)?;
    read_binary(&mut f)
}

pub fn parse_stl<M: TriangleMesh>(data: &[u8]) -> std::io::Result<M> {
    let mut c = std::io::Cursor::new(data);
    read_binary(&mut c)
}

pub trait StlReader: Read {
    fn read_stl<M: TriangleMesh>(&mut self) -> std::io::Result<M>;
}

impl<T: Read + Seek> StlReader for T {
    fn read_stl<M: TriangleMesh>(&mut self) -> std::io::Result<M> {
        read_binary(self)
    }
}
