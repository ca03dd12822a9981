//! STL reading and writing.
//!
//! ASCII files may hold several `solid ... endsolid` blocks; each becomes
//! its own [`NamedMesh`]. Binary files always yield exactly one mesh.
//!
//! ```text
//! UINT8[80]    header
//! UINT32       triangle count
//! foreach triangle
//!     REAL32[3] normal (ignored on read, recomputed on write)
//!     REAL32[3] vertex 1..3
//!     UINT16    attribute byte count
//! ```

use std::io::Write;

use card_types::{Mesh, Vertex};

use crate::NamedMesh;
use crate::error::{IoError, IoResult};

const HEADER_SIZE: usize = 80;
const TRIANGLE_SIZE: usize = 50;

/// Parse STL bytes. `fallback_name` names unnamed solids.
pub(crate) fn parse_stl(bytes: &[u8], fallback_name: &str) -> IoResult<Vec<NamedMesh>> {
    if bytes.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }
    if looks_ascii(bytes) {
        let text = String::from_utf8_lossy(bytes);
        parse_ascii(&text, fallback_name)
    } else {
        let mesh = parse_binary(bytes)?;
        Ok(vec![NamedMesh::new(fallback_name, mesh)])
    }
}

/// ASCII iff it starts with `solid` and the byte count does not match a
/// binary layout. Some exporters write `solid` into binary headers.
fn looks_ascii(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(HEADER_SIZE)];
    let starts_solid = String::from_utf8_lossy(head).trim_start().starts_with("solid");
    if !starts_solid {
        return false;
    }
    if bytes.len() >= HEADER_SIZE + 4 {
        let count = u32::from_le_bytes([
            bytes[HEADER_SIZE],
            bytes[HEADER_SIZE + 1],
            bytes[HEADER_SIZE + 2],
            bytes[HEADER_SIZE + 3],
        ]) as usize;
        if count
            .checked_mul(TRIANGLE_SIZE)
            .and_then(|n| n.checked_add(HEADER_SIZE + 4))
            == Some(bytes.len())
        {
            return false;
        }
    }
    true
}

fn parse_binary(bytes: &[u8]) -> IoResult<Mesh> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::invalid_content(format!(
            "binary STL header needs {} bytes, got {}",
            HEADER_SIZE + 4,
            bytes.len()
        )));
    }
    let count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let body = &bytes[HEADER_SIZE + 4..];
    let available = body.len() / TRIANGLE_SIZE;
    if count as usize > available {
        return Err(IoError::TruncatedStl {
            expected: count,
            got: u32::try_from(available).unwrap_or(u32::MAX),
        });
    }
    let mut mesh = Mesh::new();
    mesh.vertices.reserve(count as usize * 3);
    mesh.faces.reserve(count as usize);

    for (i, tri) in (0..count).zip(body.chunks(TRIANGLE_SIZE)) {
        if tri.len() < TRIANGLE_SIZE {
            return Err(IoError::TruncatedStl {
                expected: count,
                got: i,
            });
        }
        push_triangle(
            &mut mesh,
            [
                read_vertex(&tri[12..24]),
                read_vertex(&tri[24..36]),
                read_vertex(&tri[36..48]),
            ],
        );
    }

    let read = u32::try_from(mesh.faces.len()).unwrap_or(u32::MAX);
    if read < count {
        return Err(IoError::TruncatedStl {
            expected: count,
            got: read,
        });
    }
    Ok(mesh)
}

fn read_vertex(buf: &[u8]) -> Vertex {
    let f = |o: usize| f64::from(f32::from_le_bytes([buf[o], buf[o + 1], buf[o + 2], buf[o + 3]]));
    Vertex::from_coords(f(0), f(4), f(8))
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: indices are u32, meshes with >4B vertices are unsupported
fn push_triangle(mesh: &mut Mesh, tri: [Vertex; 3]) {
    let base = mesh.vertices.len() as u32;
    mesh.vertices.extend(tri);
    mesh.faces.push([base, base + 1, base + 2]);
}

fn parse_ascii(text: &str, fallback_name: &str) -> IoResult<Vec<NamedMesh>> {
    let mut solids = Vec::new();
    let mut current: Option<NamedMesh> = None;
    let mut pending: Vec<Vertex> = Vec::with_capacity(3);

    for (lineno, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        match keyword.to_ascii_lowercase().as_str() {
            "solid" => {
                let rest: Vec<&str> = parts.collect();
                let name = if rest.is_empty() {
                    format!("{fallback_name}.{:03}", solids.len())
                } else {
                    rest.join(" ")
                };
                if let Some(open) = current.replace(NamedMesh::new(name, Mesh::new())) {
                    solids.push(open);
                }
            }
            "outer" => pending.clear(),
            "vertex" => {
                let coords: Vec<&str> = parts.collect();
                if coords.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "vertex with fewer than 3 coordinates on line {}",
                        lineno + 1
                    )));
                }
                pending.push(Vertex::from_coords(
                    coords[0].parse()?,
                    coords[1].parse()?,
                    coords[2].parse()?,
                ));
            }
            "endfacet" => {
                if pending.len() == 3 {
                    let target = current.get_or_insert_with(|| {
                        NamedMesh::new(fallback_name, Mesh::new())
                    });
                    push_triangle(&mut target.mesh, [pending[0], pending[1], pending[2]]);
                }
                pending.clear();
            }
            "endsolid" => {
                if let Some(done) = current.take() {
                    solids.push(done);
                }
            }
            _ => {}
        }
    }
    if let Some(open) = current.take() {
        solids.push(open);
    }
    Ok(solids)
}

/// Write a mesh as STL, binary or ASCII.
pub(crate) fn write_stl<W: Write>(mesh: &Mesh, name: &str, mut out: W, binary: bool) -> IoResult<()> {
    if binary {
        let mut header = [b' '; HEADER_SIZE];
        let text = format!("binary STL {name}");
        let n = text.len().min(HEADER_SIZE);
        header[..n].copy_from_slice(&text.as_bytes()[..n]);
        out.write_all(&header)?;
        let count = u32::try_from(mesh.faces.len())
            .map_err(|_| IoError::invalid_content("too many faces for binary STL"))?;
        out.write_all(&count.to_le_bytes())?;
    } else {
        writeln!(out, "solid {name}")?;
    }

    for face in &mesh.faces {
        let [a, b, c] = face_positions(mesh, *face)?;
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        let n = if len > f64::EPSILON { n / len } else { n * 0.0 };

        #[allow(clippy::cast_possible_truncation)]
        // Truncation: STL stores f32
        if binary {
            for v in [n.x, n.y, n.z, a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z] {
                out.write_all(&(v as f32).to_le_bytes())?;
            }
            out.write_all(&0u16.to_le_bytes())?;
        } else {
            writeln!(out, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
            writeln!(out, "    outer loop")?;
            for p in [a, b, c] {
                writeln!(out, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
            }
            writeln!(out, "    endloop")?;
            writeln!(out, "  endfacet")?;
        }
    }

    if !binary {
        writeln!(out, "endsolid {name}")?;
    }
    out.flush()?;
    Ok(())
}

fn face_positions(mesh: &Mesh, face: [u32; 3]) -> IoResult<[card_types::Point3<f64>; 3]> {
    let get = |i: u32| {
        mesh.vertices
            .get(i as usize)
            .map(|v| v.position)
            .ok_or_else(|| IoError::invalid_content(format!("face references missing vertex {i}")))
    };
    Ok([get(face[0])?, get(face[1])?, get(face[2])?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_types::{Point3, box_mesh};

    const TWO_SOLIDS: &str = "solid body
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid body
solid hat
  facet normal 0 0 1
    outer loop
      vertex 0 0 5
      vertex 2 0 5
      vertex 0 2 5
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 2 0 5
      vertex 2 2 5
      vertex 0 2 5
    endloop
  endfacet
endsolid hat
";

    #[test]
    fn ascii_solids_become_separate_meshes() {
        let meshes = parse_stl(TWO_SOLIDS.as_bytes(), "model").unwrap();
        assert_eq!(meshes.len(), 2);
        assert_eq!(meshes[0].name, "body");
        assert_eq!(meshes[0].mesh.face_count(), 1);
        assert_eq!(meshes[1].name, "hat");
        assert_eq!(meshes[1].mesh.face_count(), 2);
    }

    #[test]
    fn unnamed_solid_uses_fallback() {
        let text = "solid\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nvertex 0 1 0\nendloop\nendfacet\nendsolid\n";
        let meshes = parse_stl(text.as_bytes(), "sword").unwrap();
        assert_eq!(meshes[0].name, "sword.000");
    }

    #[test]
    fn binary_written_then_parsed() {
        let mesh = box_mesh(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
        let mut buf = Vec::new();
        write_stl(&mesh, "cube", &mut buf, true).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + 4 + 12 * TRIANGLE_SIZE);

        let meshes = parse_stl(&buf, "cube").unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].mesh.face_count(), 12);
        let size = meshes[0].mesh.bounds().size();
        assert!((size.z - 3.0).abs() < 1e-6);
    }

    #[test]
    fn binary_header_starting_with_solid_is_binary() {
        let mesh = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let mut buf = Vec::new();
        write_stl(&mesh, "x", &mut buf, true).unwrap();
        buf[..5].copy_from_slice(b"solid");
        let meshes = parse_stl(&buf, "x").unwrap();
        assert_eq!(meshes[0].mesh.face_count(), 12);
    }

    #[test]
    fn truncated_binary_is_an_error() {
        let mesh = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let mut buf = Vec::new();
        write_stl(&mesh, "x", &mut buf, true).unwrap();
        buf.truncate(buf.len() - 10);
        assert!(matches!(
            parse_stl(&buf, "x"),
            Err(IoError::TruncatedStl { expected: 12, got: 11 })
        ));
    }

    #[test]
    fn ascii_round_trip_keeps_name() {
        let mesh = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let mut buf = Vec::new();
        write_stl(&mesh, "card", &mut buf, false).unwrap();
        let meshes = parse_stl(&buf, "other").unwrap();
        assert_eq!(meshes[0].name, "card");
        assert_eq!(meshes[0].mesh.face_count(), 12);
    }
}
