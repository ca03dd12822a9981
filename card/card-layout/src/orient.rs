//! Orientation selection.
//!
//! Chooses a quarter-turn rotation that lays an object flat with its long
//! axis along X: width ≥ height ≥ depth on the card.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use card_scene::{AabbOracle, EntityHandle, EntityState};
use card_transform::{Axis, Transform, quarter_turn};

use crate::error::{LayoutError, LayoutResult};

/// Weight of an axis-order violation, per millimeter.
pub const ORDER_PENALTY: f64 = 1000.0;

/// Weight of depth in the score.
pub const DEPTH_WEIGHT: f64 = 0.1;

/// How an asset is turned before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationStrategy {
    /// Score every quarter-turn candidate and keep the best.
    #[default]
    CandidateSearch,
    /// Roll −90° about X through the object's center if it is taller than deep.
    XRoll,
}

/// A named candidate rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Human-readable label, e.g. `Ry(+90)·Rz(+90)`.
    pub label: &'static str,
    /// The rotation, left-multiplied onto the current transform.
    pub rotation: Rotation3<f64>,
}

/// The fixed candidate set, in tie-break order.
///
/// Identity, ±90° about each axis, then the compounds `Rx(+90)·Rz(±90)` and
/// `Ry(+90)·Rz(±90)` (the Z turn is applied first).
#[must_use]
pub fn candidates() -> [Candidate; 11] {
    let c = |label, rotation| Candidate { label, rotation };
    [
        c("identity", Rotation3::identity()),
        c("Rx(+90)", quarter_turn(Axis::X, 1)),
        c("Rx(-90)", quarter_turn(Axis::X, -1)),
        c("Ry(+90)", quarter_turn(Axis::Y, 1)),
        c("Ry(-90)", quarter_turn(Axis::Y, -1)),
        c("Rz(+90)", quarter_turn(Axis::Z, 1)),
        c("Rz(-90)", quarter_turn(Axis::Z, -1)),
        c("Rx(+90)·Rz(+90)", quarter_turn(Axis::X, 1) * quarter_turn(Axis::Z, 1)),
        c("Rx(+90)·Rz(-90)", quarter_turn(Axis::X, 1) * quarter_turn(Axis::Z, -1)),
        c("Ry(+90)·Rz(+90)", quarter_turn(Axis::Y, 1) * quarter_turn(Axis::Z, 1)),
        c("Ry(+90)·Rz(-90)", quarter_turn(Axis::Y, 1) * quarter_turn(Axis::Z, -1)),
    ]
}

/// Score of a set of world extents. Lower is better.
///
/// `-dx + 0.1·dz`, plus `1000` per millimeter by which `dx ≥ dy` or
/// `dy ≥ dz` is violated.
#[must_use]
pub fn orientation_score(dims: &Vector3<f64>) -> f64 {
    let mut penalty = 0.0;
    if dims.x < dims.y {
        penalty += ORDER_PENALTY * (dims.y - dims.x);
    }
    if dims.y < dims.z {
        penalty += ORDER_PENALTY * (dims.z - dims.y);
    }
    -dims.x + DEPTH_WEIGHT * dims.z + penalty
}

/// The outcome of an orientation step. Nothing is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationChoice {
    /// Label of the winning candidate (or `x-roll` / `none`).
    pub candidate: &'static str,
    /// Its score; `NaN` for strategies that do not score.
    pub score: f64,
    /// World extents under `transform`.
    pub dims: Vector3<f64>,
    /// The new local transform to commit.
    pub transform: Transform,
}

fn require_baked<S: AabbOracle + ?Sized>(scene: &S, handle: EntityHandle) -> LayoutResult<()> {
    let state = scene.state(handle)?;
    if state == EntityState::Baked {
        Ok(())
    } else {
        Err(LayoutError::NotBaked {
            entity: scene.name(handle)?.to_string(),
            state,
        })
    }
}

/// Pick the best candidate rotation for a baked entity.
///
/// Every candidate is evaluated on a copy of the current transform; ties
/// keep the earlier candidate.
///
/// # Errors
///
/// - [`LayoutError::NotBaked`] unless the entity is `Baked`
/// - [`LayoutError::DegenerateGeometry`] if every candidate is degenerate
/// - [`LayoutError::OrientationSearchExhausted`] if no candidate scores finitely
///
/// The last two are recoverable: keep the current transform.
pub fn select_orientation<S: AabbOracle + ?Sized>(scene: &S, handle: EntityHandle) -> LayoutResult<OrientationChoice> {
    require_baked(scene, handle)?;
    let current = scene.local_transform(handle)?;

    let mut best: Option<OrientationChoice> = None;
    let mut any_solid = false;
    for cand in candidates() {
        let trial = current.rotated(&cand.rotation);
        let aabb = scene.aabb_with(handle, &trial)?;
        if aabb.is_degenerate() {
            continue;
        }
        any_solid = true;
        let dims = aabb.size();
        let score = orientation_score(&dims);
        if !score.is_finite() {
            continue;
        }
        if best.as_ref().is_none_or(|b| score < b.score) {
            best = Some(OrientationChoice {
                candidate: cand.label,
                score,
                dims,
                transform: trial,
            });
        }
    }

    let name = scene.name(handle)?;
    match best {
        Some(choice) => {
            debug!(
                "orientation for '{name}': {} (score {:.3}, dims {:.2} x {:.2} x {:.2})",
                choice.candidate, choice.score, choice.dims.x, choice.dims.y, choice.dims.z
            );
            Ok(choice)
        }
        None if !any_solid => Err(LayoutError::degenerate(name)),
        None => Err(LayoutError::OrientationSearchExhausted {
            entity: name.to_string(),
        }),
    }
}

/// Roll −90° about the X-parallel axis through the AABB center when the
/// entity is taller (Z) than deep (Y); otherwise keep it.
///
/// # Errors
///
/// - [`LayoutError::NotBaked`] unless the entity is `Baked`
/// - [`LayoutError::DegenerateGeometry`] for empty geometry
pub fn x_roll<S: AabbOracle + ?Sized>(scene: &S, handle: EntityHandle) -> LayoutResult<OrientationChoice> {
    require_baked(scene, handle)?;
    let current = scene.local_transform(handle)?;
    let aabb = scene.aabb_with(handle, &current)?;
    if aabb.is_empty() {
        return Err(LayoutError::degenerate(scene.name(handle)?));
    }
    let dims = aabb.size();
    if dims.y < dims.z {
        let rolled = current.rotated_about(&quarter_turn(Axis::X, -1), &aabb.center());
        let dims = scene.aabb_with(handle, &rolled)?.size();
        debug!("x-roll for '{}': dims now {dims:?}", scene.name(handle)?);
        Ok(OrientationChoice {
            candidate: "x-roll",
            score: f64::NAN,
            dims,
            transform: rolled,
        })
    } else {
        Ok(OrientationChoice {
            candidate: "none",
            score: f64::NAN,
            dims,
            transform: current,
        })
    }
}

/// Dispatch on the configured strategy.
///
/// # Errors
///
/// See [`select_orientation`] and [`x_roll`].
pub fn orient<S: AabbOracle + ?Sized>(
    scene: &S,
    handle: EntityHandle,
    strategy: OrientationStrategy,
) -> LayoutResult<OrientationChoice> {
    match strategy {
        OrientationStrategy::CandidateSearch => select_orientation(scene, handle),
        OrientationStrategy::XRoll => x_roll(scene, handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use card_scene::Scene;
    use card_types::{Mesh, Point3, Role, box_mesh};

    fn baked_box(dims: [f64; 3]) -> (Scene, EntityHandle) {
        let mut scene = Scene::new();
        let h = scene.add_mesh(
            "box",
            Role::Figure,
            box_mesh(Point3::origin(), Point3::from(dims)),
        );
        scene.bake(h).unwrap();
        (scene, h)
    }

    #[test]
    fn tall_object_is_laid_flat() {
        let (scene, h) = baked_box([10.0, 5.0, 20.0]);
        let choice = select_orientation(&scene, h).unwrap();
        assert!(choice.dims.z <= choice.dims.y);
        assert_eq!(choice.candidate, "Ry(+90)·Rz(+90)");
        assert_relative_eq!(choice.dims, Vector3::new(20.0, 10.0, 5.0), epsilon = 1e-9);
        assert_relative_eq!(choice.score, -19.5, epsilon = 1e-9);
    }

    #[test]
    fn already_flat_object_keeps_identity() {
        let (scene, h) = baked_box([30.0, 20.0, 10.0]);
        let choice = select_orientation(&scene, h).unwrap();
        assert_eq!(choice.candidate, "identity");
        assert!(choice.transform.is_identity());
        for cand in candidates() {
            let dims = scene.aabb_with(h, &Transform::from_rotation(cand.rotation)).unwrap().size();
            assert!(choice.score <= orientation_score(&dims));
        }
    }

    #[test]
    fn search_does_not_commit() {
        let (scene, h) = baked_box([10.0, 5.0, 20.0]);
        select_orientation(&scene, h).unwrap();
        assert!(scene.local_transform(h).unwrap().is_identity());
    }

    #[test]
    fn raw_entity_is_refused() {
        let mut scene = Scene::new();
        let h = scene.add_mesh("raw", Role::Figure, box_mesh(Point3::origin(), Point3::new(1.0, 1.0, 1.0)));
        assert!(matches!(
            select_orientation(&scene, h),
            Err(LayoutError::NotBaked { state: EntityState::Raw, .. })
        ));
    }

    #[test]
    fn placed_entity_is_refused() {
        let (mut scene, h) = baked_box([1.0, 1.0, 1.0]);
        scene.set_transform(h, Transform::identity()).unwrap();
        assert!(matches!(
            select_orientation(&scene, h),
            Err(LayoutError::NotBaked { state: EntityState::Placed, .. })
        ));
    }

    #[test]
    fn empty_mesh_is_degenerate_and_recoverable() {
        let mut scene = Scene::new();
        let h = scene.add_mesh("empty", Role::Accessory(0), Mesh::new());
        scene.bake(h).unwrap();
        let err = select_orientation(&scene, h).unwrap_err();
        assert!(matches!(err, LayoutError::DegenerateGeometry { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn x_roll_swaps_height_and_depth_in_place() {
        let (scene, h) = baked_box([10.0, 5.0, 20.0]);
        let before = scene.world_aabb(h).unwrap().center();
        let choice = x_roll(&scene, h).unwrap();
        assert_eq!(choice.candidate, "x-roll");
        assert_relative_eq!(choice.dims, Vector3::new(10.0, 20.0, 5.0), epsilon = 1e-9);
        let after = scene.aabb_with(h, &choice.transform).unwrap().center();
        assert_relative_eq!(before, after, epsilon = 1e-9);
    }

    #[test]
    fn x_roll_leaves_flat_objects() {
        let (scene, h) = baked_box([10.0, 20.0, 5.0]);
        let choice = orient(&scene, h, OrientationStrategy::XRoll).unwrap();
        assert_eq!(choice.candidate, "none");
        assert!(choice.transform.is_identity());
    }

    #[test]
    fn penalties_dominate() {
        assert!(orientation_score(&Vector3::new(5.0, 10.0, 1.0)) > orientation_score(&Vector3::new(10.0, 5.0, 1.0)));
        assert!(orientation_score(&Vector3::new(10.0, 1.0, 5.0)) > orientation_score(&Vector3::new(10.0, 5.0, 1.0)));
    }
}
