//! Asset import and export for card layout.
//!
//! Model files are read into a list of [`NamedMesh`] entries, one per
//! object in the file:
//!
//! - **STL** - binary (one mesh) or ASCII (one mesh per `solid` block)
//! - **OBJ** - one mesh per `o`/`g` block, polygons fan-triangulated
//!
//! Export writes a single mesh as binary or ASCII STL.
//!
//! # Layer 0 Crate
//!
//! Only depends on `card-types`. No scene, no layout.
//!
//! # Example
//!
//! ```no_run
//! use card_io::{load_meshes, save_stl};
//!
//! let parts = load_meshes("figure.stl").unwrap();
//! println!("{} objects, first is {}", parts.len(), parts[0].name);
//! save_stl(&parts[0].mesh, "copy.stl", true).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod obj;
mod stl;

pub use error::{IoError, IoResult};

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use card_types::Mesh;
use tracing::debug;

/// Supported model formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Stereolithography, binary or ASCII.
    Stl,
    /// Wavefront OBJ.
    Obj,
}

impl MeshFormat {
    /// Detect the format from a path's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// [`IoError::UnknownFormat`] if the extension is missing or unsupported.
    pub fn from_path<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "stl" => Ok(Self::Stl),
            "obj" => Ok(Self::Obj),
            _ => Err(IoError::UnknownFormat { extension: ext }),
        }
    }
}

/// One object read from a model file.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedMesh {
    /// Object name from the file, or derived from the file stem.
    pub name: String,
    /// Geometry in the file's coordinates.
    pub mesh: Mesh,
}

impl NamedMesh {
    /// Pair a name with a mesh.
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh,
        }
    }
}

/// Load every object in a model file.
///
/// Objects without faces are dropped. Unnamed objects take the file stem,
/// suffixed with an index when there is more than one.
///
/// # Errors
///
/// - [`IoError::FileNotFound`] if the path does not exist
/// - [`IoError::UnknownFormat`] for unsupported extensions
/// - Parse errors for malformed content
pub fn load_meshes<P: AsRef<Path>>(path: P) -> IoResult<Vec<NamedMesh>> {
    let path = path.as_ref();
    let format = MeshFormat::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|e| IoError::from_open(e, path))?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("object");

    let mut meshes = match format {
        MeshFormat::Stl => stl::parse_stl(&bytes, stem)?,
        MeshFormat::Obj => obj::parse_obj(&String::from_utf8_lossy(&bytes), stem)?,
    };
    meshes.retain(|m| !m.mesh.is_empty());

    debug!(
        "loaded {} object(s) from {}: {:?}",
        meshes.len(),
        path.display(),
        meshes.iter().map(|m| m.name.as_str()).collect::<Vec<_>>()
    );
    Ok(meshes)
}

/// Write a mesh to an STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P, binary: bool) -> IoResult<()> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh");
    let file = File::create(path)?;
    stl::write_stl(mesh, name, BufWriter::new(file), binary)?;
    debug!("wrote {} faces to {}", mesh.face_count(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(MeshFormat::from_path("a/b/Figure.STL").unwrap(), MeshFormat::Stl);
        assert_eq!(MeshFormat::from_path("x.obj").unwrap(), MeshFormat::Obj);
        assert!(matches!(
            MeshFormat::from_path("x.blend"),
            Err(IoError::UnknownFormat { extension }) if extension == "blend"
        ));
        assert!(MeshFormat::from_path("no_extension").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_meshes("definitely_missing_8731.stl").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
