//! Error types for scene operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::entity::EntityHandle;

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors that can occur while building or editing a scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Asset file does not exist.
    #[error("asset not found: {path}")]
    AssetNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Asset exists but could not be read.
    #[error("failed to import '{path}': {source}")]
    Import {
        /// The asset path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: card_io::IoError,
    },

    /// Asset was read but contained no geometry.
    #[error("asset '{path}' contains no geometry")]
    EmptyImport {
        /// The asset path.
        path: PathBuf,
    },

    /// Handle does not belong to this scene.
    #[error("unknown entity {handle}")]
    UnknownEntity {
        /// The stale or foreign handle.
        handle: EntityHandle,
    },

    /// Parenting would create a cycle.
    #[error("cannot parent '{child}' under '{parent}': cycle")]
    CyclicParent {
        /// Child entity name.
        child: String,
        /// Parent entity name.
        parent: String,
    },

    /// A world transform with non-uniform or zero scale cannot act as a parent.
    #[error("transform of '{entity}' is not invertible")]
    NonInvertible {
        /// Entity name.
        entity: String,
    },
}

impl SceneError {
    /// Map an import failure, keeping a missing file distinguishable.
    pub(crate) fn from_io(err: card_io::IoError, path: &std::path::Path) -> Self {
        match err {
            card_io::IoError::FileNotFound { path } => Self::AssetNotFound { path },
            source => Self::Import {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}
