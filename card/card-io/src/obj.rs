//! Wavefront OBJ reading.
//!
//! Vertices are global to the file; `o` and `g` lines start a new named
//! object. Each object gets a compacted vertex list holding only the
//! vertices its faces reference. Polygons are fan-triangulated and negative
//! indices count back from the most recent vertex.

use hashbrown::HashMap;

use card_types::{Mesh, Point3, Vertex};

use crate::NamedMesh;
use crate::error::{IoError, IoResult};

struct Block {
    name: String,
    mesh: Mesh,
    remap: HashMap<usize, u32>,
}

impl Block {
    fn new(name: String) -> Self {
        Self {
            name,
            mesh: Mesh::new(),
            remap: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    // Truncation: indices are u32
    fn local_index(&mut self, global: usize, positions: &[Point3<f64>]) -> u32 {
        let mesh = &mut self.mesh;
        *self.remap.entry(global).or_insert_with(|| {
            let idx = mesh.vertices.len() as u32;
            mesh.vertices.push(Vertex::new(positions[global]));
            idx
        })
    }
}

pub(crate) fn parse_obj(text: &str, fallback_name: &str) -> IoResult<Vec<NamedMesh>> {
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut blocks: Vec<Block> = Vec::new();
    let mut current = Block::new(fallback_name.to_string());

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        match keyword {
            "v" => {
                let coords: Vec<&str> = parts.take(3).collect();
                if coords.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "vertex with fewer than 3 coordinates on line {}",
                        lineno + 1
                    )));
                }
                positions.push(Point3::new(
                    coords[0].parse()?,
                    coords[1].parse()?,
                    coords[2].parse()?,
                ));
            }
            "o" | "g" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let name = if name.is_empty() {
                    format!("{fallback_name}.{:03}", blocks.len() + 1)
                } else {
                    name
                };
                let done = std::mem::replace(&mut current, Block::new(name));
                if !done.mesh.is_empty() {
                    blocks.push(done);
                }
            }
            "f" => {
                let mut corners = Vec::with_capacity(4);
                for token in parts {
                    let global = resolve_index(token, positions.len(), lineno + 1)?;
                    corners.push(current.local_index(global, &positions));
                }
                if corners.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "face with fewer than 3 corners on line {}",
                        lineno + 1
                    )));
                }
                for i in 1..corners.len() - 1 {
                    current.mesh.faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }
    if !current.mesh.is_empty() {
        blocks.push(current);
    }

    Ok(blocks
        .into_iter()
        .map(|b| NamedMesh::new(b.name, b.mesh))
        .collect())
}

/// Resolve a `v`, `v/vt`, `v//vn` or `v/vt/vn` token to a zero-based index.
fn resolve_index(token: &str, vertex_count: usize, line: usize) -> IoResult<usize> {
    let head = token.split('/').next().unwrap_or(token);
    let raw: i64 = head.parse()?;
    let count = i64::try_from(vertex_count).unwrap_or(i64::MAX);
    let resolved = if raw < 0 { count + raw } else { raw - 1 };
    if raw == 0 || resolved < 0 || resolved >= count {
        return Err(IoError::IndexOutOfRange {
            index: resolved,
            vertex_count,
            line,
        });
    }
    usize::try_from(resolved).map_err(|_| IoError::invalid_content("face index overflow"))
}
