//! Indexed triangle geometry.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;

/// A mesh vertex. Only the position matters for layout.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vertex {
    /// Position in the mesh's local frame.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a vertex at a point.
    #[inline]
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    #[must_use]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// An indexed triangle mesh.
///
/// Faces use counter-clockwise winding seen from outside.
///
/// # Example
///
/// ```
/// use card_types::{Mesh, Vertex};
///
/// let mesh = Mesh::from_parts(
///     vec![
///         Vertex::from_coords(0.0, 0.0, 0.0),
///         Vertex::from_coords(1.0, 0.0, 0.0),
///         Vertex::from_coords(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangles as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces.
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True if the mesh has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Local-space bounds. Empty for a mesh without vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| v.position))
    }

    /// Append another mesh, offsetting its face indices.
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: indices are u32, meshes past 4B vertices are unsupported
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
    }

    /// Replace every vertex position with `f(position)`.
    pub fn map_positions<F>(&mut self, mut f: F)
    where
        F: FnMut(Point3<f64>) -> Point3<f64>,
    {
        for v in &mut self.vertices {
            v.position = f(v.position);
        }
    }
}

/// A closed box spanning two corners, 8 vertices and 12 triangles.
#[must_use]
pub fn box_mesh(min: Point3<f64>, max: Point3<f64>) -> Mesh {
    let b = Aabb::new(min, max);
    let vertices = b.corners().iter().copied().map(Vertex::new).collect();
    // Corner order from Aabb::corners: bit 0 = x, bit 1 = y, bit 2 = z.
    #[rustfmt::skip]
    let faces = vec![
        [0, 2, 1], [1, 2, 3], // -Z
        [4, 5, 6], [5, 7, 6], // +Z
        [0, 1, 4], [1, 5, 4], // -Y
        [2, 6, 3], [3, 6, 7], // +Y
        [0, 4, 2], [2, 4, 6], // -X
        [1, 3, 5], [3, 7, 5], // +X
    ];
    Mesh::from_parts(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_mesh_bounds() {
        let m = box_mesh(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(m.vertex_count(), 8);
        assert_eq!(m.face_count(), 12);
        let b = m.bounds();
        assert_relative_eq!(b.size().x, 2.0);
        assert_relative_eq!(b.size().y, 4.0);
        assert_relative_eq!(b.size().z, 6.0);
    }

    #[test]
    fn merge_offsets_indices() {
        let mut a = box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = box_mesh(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0));
        a.merge(&b);
        assert_eq!(a.vertex_count(), 16);
        assert_eq!(a.face_count(), 24);
        assert!(a.faces[12..].iter().all(|f| f.iter().all(|&i| i >= 8)));
        assert_relative_eq!(a.bounds().max.x, 3.0);
    }

    #[test]
    fn empty_mesh_bounds_are_empty() {
        assert!(Mesh::new().bounds().is_empty());
    }
}
