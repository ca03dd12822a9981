//! Two-line text group composition.
//!
//! The steps run in a fixed order, each relying on the previous one:
//!
//! 1. center each line on `X = 0` and stack them with `gap` between
//! 2. parent both under one pivot at the union center, keeping world placement
//! 3. scale the pivot so the union height is `min(target, slot height)`,
//!    then re-center it in the slot's Y span
//! 4. center on the slot's X and lift so the lowest point sits `lift` above
//!    the card top

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use card_scene::{AabbOracle, EntityHandle, Scene};
use card_types::{DEGENERATE_EXTENT, Point3, Rect, Role, Vector3};

use crate::error::LayoutResult;

/// Name given to the text pivot.
pub const TEXT_GROUP_NAME: &str = "text_group";

/// Text group parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextGroupParams {
    /// Vertical gap between title and subtitle.
    pub gap: f64,
    /// Requested total height of both lines, capped by the slot.
    pub target_height: f64,
    /// Height of the group's underside above the card top.
    pub lift: f64,
}

impl Default for TextGroupParams {
    fn default() -> Self {
        Self {
            gap: 0.0,
            target_height: 20.0,
            lift: 0.2,
        }
    }
}

impl TextGroupParams {
    /// Set the gap.
    #[must_use]
    pub const fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set the target height.
    #[must_use]
    pub const fn with_target_height(mut self, height: f64) -> Self {
        self.target_height = height;
        self
    }

    /// Set the lift.
    #[must_use]
    pub const fn with_lift(mut self, lift: f64) -> Self {
        self.lift = lift;
        self
    }
}

/// What the composer did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextGroupOutcome {
    /// The pivot entity.
    pub group: EntityHandle,
    /// Union height after stacking, before scaling.
    pub stacked_height: f64,
    /// Scale applied to the pivot (`1.0` when skipped).
    pub factor: f64,
    /// False when the union had no height and scaling was skipped.
    pub scaled: bool,
}

fn translate(scene: &mut Scene, handle: EntityHandle, delta: Vector3<f64>) -> LayoutResult<()> {
    let moved = scene.local_transform(handle)?.translated(delta);
    scene.set_transform(handle, moved)?;
    Ok(())
}

/// Place one line centered on `X = 0` with its Y center at `y`.
/// Returns false for lines with no geometry.
fn center_line(scene: &mut Scene, handle: EntityHandle, y: f64) -> LayoutResult<bool> {
    let aabb = scene.world_aabb(handle)?;
    if aabb.is_empty() {
        return Ok(false);
    }
    let c = aabb.center();
    translate(scene, handle, Vector3::new(-c.x, y - c.y, 0.0))?;
    Ok(true)
}

/// Stack, group, scale and lift a title/subtitle pair.
///
/// Both lines must already read correctly from +Z. The returned pivot is the
/// only entity later steps should move.
///
/// # Errors
///
/// Scene failures only; empty lines are tolerated.
pub fn compose_text_group(
    scene: &mut Scene,
    title: EntityHandle,
    subtitle: EntityHandle,
    slot: &Rect,
    card_top_z: f64,
    params: &TextGroupParams,
) -> LayoutResult<TextGroupOutcome> {
    let height_of = |scene: &Scene, h: EntityHandle| -> LayoutResult<f64> {
        let aabb = scene.world_aabb(h)?;
        Ok(if aabb.is_empty() { 0.0 } else { aabb.size().y })
    };
    let title_h = height_of(&*scene, title)?;
    let sub_h = height_of(&*scene, subtitle)?;

    center_line(scene, title, 0.5 * (sub_h + params.gap))?;
    center_line(scene, subtitle, -0.5 * (title_h + params.gap))?;

    let union = scene.world_aabb(title)?.union(&scene.world_aabb(subtitle)?);
    let pivot = if union.is_empty() {
        Point3::origin()
    } else {
        union.center()
    };
    let group = scene.add_group(TEXT_GROUP_NAME, Role::TextGroup, pivot);
    scene.parent_keep_world(title, group)?;
    scene.parent_keep_world(subtitle, group)?;

    let stacked = scene.world_aabb(group)?;
    let stacked_height = if stacked.is_empty() { 0.0 } else { stacked.size().y };

    if stacked_height < DEGENERATE_EXTENT {
        warn!("text group has no height; leaving it unscaled");
        if !stacked.is_empty() {
            translate(scene, group, Vector3::new(0.0, 0.0, card_top_z + params.lift - stacked.min.z))?;
        }
        return Ok(TextGroupOutcome {
            group,
            stacked_height,
            factor: 1.0,
            scaled: false,
        });
    }

    let desired = params.target_height.min(slot.height);
    let factor = desired / stacked_height;
    let scaled = scene
        .local_transform(group)?
        .scaled_about(factor, &stacked.center());
    scene.set_transform(group, scaled)?;

    let after = scene.world_aabb(group)?;
    let c = after.center();
    translate(
        scene,
        group,
        Vector3::new(
            slot.x_center - c.x,
            slot.y_center - c.y,
            card_top_z + params.lift - after.min.z,
        ),
    )?;

    debug!("text group: stacked {stacked_height:.3} mm, target {desired:.3} mm, factor {factor:.4}");
    Ok(TextGroupOutcome {
        group,
        stacked_height,
        factor,
        scaled: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use card_types::{Mesh, box_mesh};

    fn line(scene: &mut Scene, name: &str, role: Role, w: f64, h: f64) -> EntityHandle {
        let handle = scene.add_mesh(
            name,
            role,
            box_mesh(Point3::new(3.0, 7.0, 0.0), Point3::new(3.0 + w, 7.0 + h, 0.8)),
        );
        scene.bake(handle).unwrap();
        handle
    }

    fn strip() -> Rect {
        Rect::new(0.0, 80.0, 122.0, 18.0)
    }

    #[test]
    fn stack_height_and_slot_capped_factor() {
        let mut scene = Scene::new();
        let title = line(&mut scene, "title", Role::Title, 60.0, 8.0);
        let sub = line(&mut scene, "subtitle", Role::Subtitle, 40.0, 5.0);
        let params = TextGroupParams::default().with_gap(2.0).with_target_height(20.0);

        let out = compose_text_group(&mut scene, title, sub, &strip(), 0.0, &params).unwrap();

        assert_relative_eq!(out.stacked_height, 15.0, epsilon = 1e-9);
        assert_relative_eq!(out.factor, 1.2, epsilon = 1e-9);
        assert!(out.scaled);

        let union = scene.world_aabb(out.group).unwrap();
        assert_relative_eq!(union.size().y, 18.0, epsilon = 1e-9);
        assert_relative_eq!(union.center().y, 80.0, epsilon = 1e-9);
        assert_relative_eq!(union.center().x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(union.min.z, 0.2, epsilon = 1e-9);
    }

    #[test]
    fn lines_keep_the_scaled_gap() {
        let mut scene = Scene::new();
        let title = line(&mut scene, "title", Role::Title, 60.0, 8.0);
        let sub = line(&mut scene, "subtitle", Role::Subtitle, 40.0, 5.0);
        let params = TextGroupParams::default().with_gap(2.0).with_target_height(7.5);

        let out = compose_text_group(&mut scene, title, sub, &strip(), -1.0, &params).unwrap();
        assert_relative_eq!(out.factor, 0.5, epsilon = 1e-9);

        let t = scene.world_aabb(title).unwrap();
        let s = scene.world_aabb(sub).unwrap();
        assert_relative_eq!(t.min.y - s.max.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(t.center().x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(s.center().x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(t.min.z, -0.8, epsilon = 1e-9);
    }

    #[test]
    fn children_follow_the_pivot() {
        let mut scene = Scene::new();
        let title = line(&mut scene, "title", Role::Title, 60.0, 8.0);
        let sub = line(&mut scene, "subtitle", Role::Subtitle, 40.0, 5.0);
        let out = compose_text_group(&mut scene, title, sub, &strip(), 0.0, &TextGroupParams::default()).unwrap();

        let before = scene.world_aabb(title).unwrap();
        let moved = scene
            .local_transform(out.group)
            .unwrap()
            .translated(Vector3::new(5.0, 0.0, 0.0));
        scene.set_transform(out.group, moved).unwrap();
        assert_relative_eq!(scene.world_aabb(title).unwrap().min.x, before.min.x + 5.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_lines_skip_scaling() {
        let mut scene = Scene::new();
        let title = scene.add_mesh("title", Role::Title, Mesh::new());
        let sub = scene.add_mesh("subtitle", Role::Subtitle, Mesh::new());
        let out = compose_text_group(&mut scene, title, sub, &strip(), 0.0, &TextGroupParams::default()).unwrap();
        assert!(!out.scaled);
        assert_relative_eq!(out.factor, 1.0);
        assert_eq!(scene.entity(out.group).unwrap().children(), &[title, sub]);
    }

    #[test]
    fn one_empty_line_still_scales_the_other() {
        let mut scene = Scene::new();
        let title = line(&mut scene, "title", Role::Title, 60.0, 8.0);
        let sub = scene.add_mesh("subtitle", Role::Subtitle, Mesh::new());
        let params = TextGroupParams::default().with_target_height(16.0);
        let out = compose_text_group(&mut scene, title, sub, &strip(), 0.0, &params).unwrap();
        assert_relative_eq!(out.stacked_height, 8.0, epsilon = 1e-9);
        assert_relative_eq!(out.factor, 2.0, epsilon = 1e-9);
    }
}
