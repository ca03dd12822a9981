//! Error types for layout operations.

use card_scene::{EntityState, SceneError};
use thiserror::Error;

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors raised by the layout engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Card dimensions or ratios cannot produce a valid slot grid.
    #[error("invalid card: {reason}")]
    InvalidCard {
        /// What was wrong.
        reason: String,
    },

    /// Entity has no extent to orient, fit or snap.
    #[error("'{entity}' has degenerate geometry")]
    DegenerateGeometry {
        /// Entity name.
        entity: String,
    },

    /// No candidate rotation produced a usable score.
    #[error("orientation search for '{entity}' found no usable candidate")]
    OrientationSearchExhausted {
        /// Entity name.
        entity: String,
    },

    /// Orientation requested on an entity whose transform is not flattened.
    #[error("'{entity}' must be baked before orientation (state {state:?})")]
    NotBaked {
        /// Entity name.
        entity: String,
        /// Its actual state.
        state: EntityState,
    },

    /// Scene lookup or edit failed.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl LayoutError {
    /// True if the caller may proceed with an identity/no-op result.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DegenerateGeometry { .. } | Self::OrientationSearchExhausted { .. }
        )
    }

    pub(crate) fn degenerate(entity: &str) -> Self {
        Self::DegenerateGeometry {
            entity: entity.to_string(),
        }
    }
}
