//! Uniform fit scaling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use card_scene::{AabbOracle, EntityHandle};
use card_types::{DEGENERATE_EXTENT, Vector3};

use crate::error::LayoutResult;

/// Smallest usable target extent after margins are removed.
pub const TARGET_FLOOR: f64 = 1e-6;

/// Whether a fit multiplies or replaces the current scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Multiply the existing scale. Repeated calls shrink repeatedly.
    #[default]
    Compound,
    /// Measure at unit scale and set the scale outright. Idempotent.
    Replace,
}

/// Target box for a uniform fit.
///
/// # Example
///
/// ```
/// use card_layout::FitParams;
///
/// let params = FitParams::new(100.0, 50.0).with_margin(5.0);
/// assert_eq!(params.usable_width(), 90.0);
/// assert_eq!(params.usable_height(), 40.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParams {
    /// Slot width.
    pub target_width: f64,
    /// Slot height.
    pub target_height: f64,
    /// Clearance kept on every side of the slot.
    pub margin: f64,
    /// Optional ceiling on the Z extent.
    pub target_depth: Option<f64>,
    /// Compound or replace.
    pub mode: FitMode,
}

impl FitParams {
    /// Fit into `width × height` with no margin, depth ceiling or replace.
    #[must_use]
    pub const fn new(target_width: f64, target_height: f64) -> Self {
        Self {
            target_width,
            target_height,
            margin: 0.0,
            target_depth: None,
            mode: FitMode::Compound,
        }
    }

    /// Set the margin.
    #[must_use]
    pub const fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Set or clear the depth ceiling.
    #[must_use]
    pub const fn with_target_depth(mut self, depth: Option<f64>) -> Self {
        self.target_depth = depth;
        self
    }

    /// Set the scale mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: FitMode) -> Self {
        self.mode = mode;
        self
    }

    /// `max(floor, width - 2·margin)`.
    #[must_use]
    pub fn usable_width(&self) -> f64 {
        (self.target_width - 2.0 * self.margin).max(TARGET_FLOOR)
    }

    /// `max(floor, height - 2·margin)`.
    #[must_use]
    pub fn usable_height(&self) -> f64 {
        (self.target_height - 2.0 * self.margin).max(TARGET_FLOOR)
    }
}

/// The uniform factor fitting `dims` into `params`, or `None` if `dims` is
/// degenerate on a constrained axis.
///
/// Non-finite or non-positive results collapse to `1.0`.
#[must_use]
pub fn uniform_factor(dims: &Vector3<f64>, params: &FitParams) -> Option<f64> {
    if dims.x < DEGENERATE_EXTENT || dims.y < DEGENERATE_EXTENT {
        return None;
    }
    let mut factor = (params.usable_width() / dims.x).min(params.usable_height() / dims.y);
    if let Some(depth) = params.target_depth {
        if dims.z < DEGENERATE_EXTENT {
            return None;
        }
        factor = factor.min(depth / dims.z);
    }
    if factor.is_finite() && factor > 0.0 {
        Some(factor)
    } else {
        Some(1.0)
    }
}

/// Result of [`fit`]. Nothing is committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOutcome {
    /// New local transform.
    pub transform: card_transform::Transform,
    /// Factor applied (`1.0` when skipped).
    pub factor: f64,
    /// World Z extent under `transform`, a depth ceiling for later siblings.
    pub depth: f64,
    /// True when the entity was too thin to measure and was left alone.
    pub degenerate: bool,
}

/// Uniformly scale an entity to fit `params`.
///
/// Degenerate geometry is a defined no-op: the transform is returned
/// unchanged with `degenerate = true`.
///
/// # Errors
///
/// Only scene lookup failures.
pub fn fit<S: AabbOracle + ?Sized>(scene: &S, handle: EntityHandle, params: &FitParams) -> LayoutResult<FitOutcome> {
    let current = scene.local_transform(handle)?;
    let measured_under = match params.mode {
        FitMode::Compound => current,
        FitMode::Replace => current.with_uniform_scale(1.0),
    };
    let dims = scene.aabb_with(handle, &measured_under)?.size();

    let Some(factor) = uniform_factor(&dims, params) else {
        let depth = scene.aabb_with(handle, &current)?.size().z.max(0.0);
        debug!("fit skipped for '{}': degenerate dims {dims:?}", scene.name(handle)?);
        return Ok(FitOutcome {
            transform: current,
            factor: 1.0,
            depth,
            degenerate: true,
        });
    };

    let transform = match params.mode {
        FitMode::Compound => current.with_scale_factor(factor),
        FitMode::Replace => current.with_uniform_scale(factor),
    };
    let depth = scene.aabb_with(handle, &transform)?.size().z;
    debug!(
        "fit '{}' into {:.2} x {:.2}: factor {factor:.4}, depth {depth:.3}",
        scene.name(handle)?,
        params.usable_width(),
        params.usable_height()
    );
    Ok(FitOutcome {
        transform,
        factor,
        depth,
        degenerate: false,
    })
}
