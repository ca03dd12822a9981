//! Layout engine for starter pack cards.
//!
//! Given a [`Scene`](card_scene::Scene) whose entities are known only by
//! their AABBs and transforms, this crate:
//!
//! - picks a flat, long-axis-horizontal orientation ([`select_orientation`],
//!   or the single-axis [`x_roll`])
//! - scales uniformly into a slot with margins and an optional depth
//!   ceiling ([`fit`])
//! - derives the slot grid from card size and ratios ([`CardPlan`])
//! - stacks, groups, scales and lifts the two text lines
//!   ([`compose_text_group`])
//! - snaps objects onto the card ([`snap`])
//! - captures the final footprints ([`serialize_layout`])
//!
//! Steps that move an entity return a new
//! [`Transform`](card_transform::Transform); committing it is the caller's
//! decision. Only the text composer edits the scene directly, since
//! grouping is part of its contract.
//!
//! # Layer 0 Crate
//!
//! Pure geometry. No file I/O, no rendering.
//!
//! # Example
//!
//! ```
//! use card_layout::{CardPlan, CardSpec, FitParams, fit, snap, SnapParams};
//! use card_scene::{Scene, card_plate};
//! use card_types::{Point3, Role, box_mesh};
//!
//! let spec = CardSpec::default();
//! let plan = CardPlan::compute(&spec).unwrap();
//!
//! let mut scene = Scene::new();
//! let card = scene.add_mesh("card", Role::Card, card_plate(spec.width, spec.height, spec.thickness, spec.fillet_radius));
//! let fig = scene.add_mesh("hero", Role::Figure, box_mesh(Point3::origin(), Point3::new(200.0, 300.0, 40.0)));
//!
//! let slot = plan.figure;
//! let out = fit(&scene, fig, &FitParams::new(slot.width, slot.height).with_margin(4.0)).unwrap();
//! scene.set_transform(fig, out.transform).unwrap();
//! let snapped = snap(&scene, fig, card, &SnapParams::default()).unwrap();
//! scene.set_transform(fig, snapped).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod error;
mod fit;
mod orient;
mod planner;
mod serialize;
mod snap;
mod text;

pub use error::{LayoutError, LayoutResult};
pub use fit::{FitMode, FitOutcome, FitParams, TARGET_FLOOR, fit, uniform_factor};
pub use orient::{
    Candidate, DEPTH_WEIGHT, ORDER_PENALTY, OrientationChoice, OrientationStrategy, candidates, orient,
    orientation_score, select_orientation, x_roll,
};
pub use planner::{
    ACCESSORY_CELLS, ACCESSORY_COLUMN_FRACTION, AccessoryPolicy, CardPlan, CardSpec, FIGURE_WIDTH_FRACTION,
};
pub use serialize::{
    CardMeta, LayoutDocument, LayoutMeta, LayoutRecord, Size2, SlotsMeta, StripSize, layout_record,
    serialize_layout,
};
pub use snap::{SnapParams, center_xy_at, rest_on_plane, snap};
pub use text::{TEXT_GROUP_NAME, TextGroupOutcome, TextGroupParams, compose_text_group};
