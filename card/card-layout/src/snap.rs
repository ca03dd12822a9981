//! Vertical snapping and planar placement.
//!
//! Every function returns a new local transform for a root entity; the
//! caller commits it.

use serde::{Deserialize, Serialize};

use card_scene::{AabbOracle, EntityHandle};
use card_transform::Transform;
use card_types::Vector3;

use crate::error::{LayoutError, LayoutResult};

/// Snap parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapParams {
    /// Gap left between the base's top and the object's bottom.
    pub offset: f64,
}

impl SnapParams {
    /// Snap with an offset.
    #[must_use]
    pub const fn with_offset(offset: f64) -> Self {
        Self { offset }
    }
}

fn nonempty<S: AabbOracle + ?Sized>(scene: &S, handle: EntityHandle) -> LayoutResult<card_types::Aabb> {
    let aabb = scene.world_aabb(handle)?;
    if aabb.is_empty() {
        return Err(LayoutError::degenerate(scene.name(handle)?));
    }
    Ok(aabb)
}

/// Move `obj` along Z so its bottom rests on `base`'s top plus `offset`.
///
/// Idempotent: a second call with the same arguments moves nothing.
///
/// # Errors
///
/// [`LayoutError::DegenerateGeometry`] if either entity has no geometry.
pub fn snap<S: AabbOracle + ?Sized>(
    scene: &S,
    obj: EntityHandle,
    base: EntityHandle,
    params: &SnapParams,
) -> LayoutResult<Transform> {
    let top = nonempty(scene, base)?.max.z;
    rest_on_plane(scene, obj, top + params.offset)
}

/// Move `obj` along Z so its bottom lies at `z`.
///
/// # Errors
///
/// [`LayoutError::DegenerateGeometry`] for empty geometry.
pub fn rest_on_plane<S: AabbOracle + ?Sized>(scene: &S, obj: EntityHandle, z: f64) -> LayoutResult<Transform> {
    let bottom = nonempty(scene, obj)?.min.z;
    Ok(scene
        .local_transform(obj)?
        .translated(Vector3::new(0.0, 0.0, z - bottom)))
}

/// Move `obj` in XY so its AABB center lies at `(x, y)`. Z is untouched.
///
/// # Errors
///
/// [`LayoutError::DegenerateGeometry`] for empty geometry.
pub fn center_xy_at<S: AabbOracle + ?Sized>(scene: &S, obj: EntityHandle, x: f64, y: f64) -> LayoutResult<Transform> {
    let c = nonempty(scene, obj)?.center();
    Ok(scene
        .local_transform(obj)?
        .translated(Vector3::new(x - c.x, y - c.y, 0.0)))
}
