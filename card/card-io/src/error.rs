//! Error types for asset I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for asset I/O.
pub type IoResult<T> = Result<T, IoError>;

/// Errors raised while reading or writing mesh files.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Extension is not one of the supported formats.
    #[error("unknown file format: .{extension}")]
    UnknownFormat {
        /// The unrecognized extension (empty if none).
        extension: String,
    },

    /// File parsed but the content is malformed.
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// What was wrong.
        message: String,
    },

    /// Binary STL ended before the declared triangle count.
    #[error("truncated STL: header declares {expected} triangles, found {got}")]
    TruncatedStl {
        /// Declared triangle count.
        expected: u32,
        /// Triangles actually read.
        got: u32,
    },

    /// A face index points outside the vertex list.
    #[error("face index {index} out of range (vertex count {vertex_count}) on line {line}")]
    IndexOutOfRange {
        /// Resolved zero-based index (may be negative if underflowed).
        index: i64,
        /// Vertices defined so far.
        vertex_count: usize,
        /// One-based source line.
        line: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// Integer parsing error.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }

    /// Map an open/read error, turning `NotFound` into [`IoError::FileNotFound`].
    pub(crate) fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }
}
