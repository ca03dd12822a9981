//! Error types for job execution.

use std::fmt;
use std::path::PathBuf;

use card_layout::LayoutError;
use card_types::Role;
use thiserror::Error;

/// Result type for job execution.
pub type JobResult<T> = Result<T, JobError>;

/// Pipeline stage, for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Loading and validating configuration.
    Config,
    /// Card plate and slot planning.
    Card,
    /// Text creation and grouping.
    Text,
    /// Figure import and placement.
    Figure,
    /// Accessory import and placement, by slot.
    Accessory(usize),
    /// Layout capture and writing.
    Serialize,
    /// Mesh export.
    Export,
    /// Text group render.
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => f.write_str("config"),
            Self::Card => f.write_str("card"),
            Self::Text => f.write_str("text"),
            Self::Figure => f.write_str("figure"),
            Self::Accessory(i) => write!(f, "accessory[{i}]"),
            Self::Serialize => f.write_str("serialize"),
            Self::Export => f.write_str("export"),
            Self::Render => f.write_str("render"),
        }
    }
}

/// Errors that can end (or, for accessories, shorten) a job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    Config {
        /// What was wrong.
        reason: String,
    },

    /// An asset path does not exist.
    #[error("{role} asset not found: {path}")]
    AssetNotFound {
        /// Which asset.
        role: Role,
        /// The missing path.
        path: PathBuf,
    },

    /// An asset exists but could not be imported.
    #[error("{role} asset '{path}' could not be imported: {source}")]
    Import {
        /// Which asset.
        role: Role,
        /// The asset path.
        path: PathBuf,
        /// Underlying scene error.
        #[source]
        source: card_scene::SceneError,
    },

    /// A layout step failed.
    #[error("layout failed at {stage}: {source}")]
    Layout {
        /// Where.
        stage: Stage,
        /// Underlying error.
        #[source]
        source: LayoutError,
    },

    /// An external process exceeded its time budget and was killed.
    #[error("{stage}: '{program}' timed out after {timeout_secs} s")]
    ExternalProcessTimeout {
        /// Where.
        stage: Stage,
        /// Program that was run.
        program: String,
        /// Budget in seconds.
        timeout_secs: u64,
    },

    /// An external process exited unsuccessfully or could not start.
    #[error("{stage}: '{program}' failed (exit code {code:?}): {diagnostics}")]
    ExternalProcessFailure {
        /// Where.
        stage: Stage,
        /// Program that was run.
        program: String,
        /// Exit code, if the process ran and exited normally.
        code: Option<i32>,
        /// Captured stderr (or stdout when stderr is empty).
        diagnostics: String,
    },

    /// Mesh export failed.
    #[error("failed to export '{path}': {source}")]
    Export {
        /// Target file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: card_io::IoError,
    },

    /// File system error.
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// The path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding failed.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl JobError {
    /// False only for per-accessory problems the job skips over.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::AssetNotFound {
                role: Role::Accessory(_),
                ..
            } | Self::Import {
                role: Role::Accessory(_),
                ..
            }
        )
    }

    /// Wrap a layout or scene error with its stage.
    pub fn layout(stage: Stage) -> impl FnOnce(LayoutError) -> Self {
        move |source| Self::Layout { stage, source }
    }

    /// Wrap a scene error with its stage.
    pub fn scene(stage: Stage) -> impl FnOnce(card_scene::SceneError) -> Self {
        move |source| Self::Layout {
            stage,
            source: LayoutError::Scene(source),
        }
    }

    /// Wrap an I/O error with its path.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn import(role: Role, path: PathBuf, source: card_scene::SceneError) -> Self {
        match source {
            card_scene::SceneError::AssetNotFound { path } => Self::AssetNotFound { role, path },
            source => Self::Import { role, path, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_accessory_asset_problems_are_non_fatal() {
        let missing_acc = JobError::AssetNotFound {
            role: Role::Accessory(2),
            path: "a.stl".into(),
        };
        let missing_fig = JobError::AssetNotFound {
            role: Role::Figure,
            path: "f.stl".into(),
        };
        assert!(!missing_acc.is_fatal());
        assert!(missing_fig.is_fatal());
        assert!(
            JobError::ExternalProcessTimeout {
                stage: Stage::Render,
                program: "blender".into(),
                timeout_secs: 1
            }
            .is_fatal()
        );
    }

    #[test]
    fn messages_carry_context() {
        let err = JobError::layout(Stage::Accessory(1))(LayoutError::InvalidCard { reason: "x".into() });
        assert_eq!(err.to_string(), "layout failed at accessory[1]: invalid card: x");
    }

    #[test]
    fn scene_not_found_maps_to_asset_not_found() {
        let err = JobError::import(
            Role::Figure,
            "hero.stl".into(),
            card_scene::SceneError::AssetNotFound {
                path: "hero.stl".into(),
            },
        );
        assert!(matches!(err, JobError::AssetNotFound { role: Role::Figure, .. }));
    }
}
