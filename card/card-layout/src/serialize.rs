//! Layout records and the layout document.

use serde::{Deserialize, Serialize};

use card_scene::{AabbOracle, EntityHandle};
use card_types::{Role, Vec2};

use crate::error::LayoutResult;
use crate::planner::{CardPlan, CardSpec};

/// Width and height of a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size2 {
    /// Extent along X.
    pub w: f64,
    /// Extent along Y.
    pub h: f64,
}

/// Final top-view footprint of one placed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    /// Entity name.
    pub name: String,
    /// Role tag: `card`, `figure`, `accessory`, `text`.
    pub role: String,
    /// Accessory slot index, for accessories only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
    /// Midpoint of the XY bounds.
    pub center: Vec2,
    /// XY bounds extent.
    pub size: Size2,
    /// Z component of the world rotation (XYZ Euler), degrees.
    pub rotation_z_deg: f64,
}

/// Card block of the layout metadata, post-padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardMeta {
    /// Padded width.
    #[serde(rename = "W")]
    pub width: f64,
    /// Padded height.
    #[serde(rename = "H")]
    pub height: f64,
    /// Plate thickness.
    pub card_thickness: f64,
    /// Upper band ratio.
    pub upper_ratio: f64,
    /// Padding removed from each side.
    pub padding_card: f64,
}

/// Height-only slot size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StripSize {
    /// Strip height.
    pub h: f64,
}

/// Slot block of the layout metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotsMeta {
    /// Figure slot.
    pub figure: Size2,
    /// Accessory column.
    pub accessories: Size2,
    /// Text strip.
    pub text_strip: StripSize,
}

/// Job-level metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMeta {
    /// Job identifier.
    pub job_id: String,
    /// Always `mm`.
    pub units: String,
    /// Card dimensions.
    pub card: CardMeta,
    /// Slot dimensions.
    pub slots: SlotsMeta,
}

impl LayoutMeta {
    /// Metadata for a planned card.
    #[must_use]
    pub fn new(job_id: impl Into<String>, spec: &CardSpec, plan: &CardPlan) -> Self {
        Self {
            job_id: job_id.into(),
            units: "mm".to_string(),
            card: CardMeta {
                width: plan.footprint.width,
                height: plan.footprint.height,
                card_thickness: spec.thickness,
                upper_ratio: spec.upper_ratio,
                padding_card: spec.padding,
            },
            slots: SlotsMeta {
                figure: Size2 {
                    w: plan.figure.width,
                    h: plan.figure.height,
                },
                accessories: Size2 {
                    w: plan.accessory_column.width,
                    h: plan.accessory_column.height,
                },
                text_strip: StripSize {
                    h: plan.text_strip.height,
                },
            },
        }
    }
}

/// The layout file: metadata plus one record per placed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Job metadata.
    pub meta: LayoutMeta,
    /// Records in placement order.
    pub items: Vec<LayoutRecord>,
}

impl LayoutDocument {
    /// Pretty JSON.
    ///
    /// # Errors
    ///
    /// Serialization failures from `serde_json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a layout document.
    ///
    /// # Errors
    ///
    /// Malformed JSON or a missing field.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Records with a given role tag.
    pub fn items_with_role<'a>(&'a self, role: &'a str) -> impl Iterator<Item = &'a LayoutRecord> + 'a {
        self.items.iter().filter(move |r| r.role == role)
    }
}

/// Read one entity's final footprint. Never mutates the scene.
///
/// Entities without geometry are recorded at their world origin with a
/// zero size.
///
/// # Errors
///
/// Scene lookup failures.
pub fn layout_record<S: AabbOracle + ?Sized>(scene: &S, handle: EntityHandle) -> LayoutResult<LayoutRecord> {
    let aabb = scene.world_aabb(handle)?;
    let world = scene.world_transform(handle)?;
    let (center, size) = if aabb.is_empty() {
        let t = world.translation();
        (Vec2::new(t.x, t.y), Size2::default())
    } else {
        let rect = aabb.xy_rect();
        (
            rect.center(),
            Size2 {
                w: rect.width,
                h: rect.height,
            },
        )
    };
    let role = scene.role(handle)?;
    Ok(LayoutRecord {
        name: scene.name(handle)?.to_string(),
        role: role.as_str().to_string(),
        slot: match role {
            Role::Accessory(i) => Some(i),
            _ => None,
        },
        center,
        size,
        rotation_z_deg: world.euler_z().to_degrees(),
    })
}

/// Serialize every listed entity, in order.
///
/// # Errors
///
/// Scene lookup failures.
pub fn serialize_layout<S: AabbOracle + ?Sized>(
    scene: &S,
    entities: &[EntityHandle],
    meta: LayoutMeta,
) -> LayoutResult<LayoutDocument> {
    let items = entities
        .iter()
        .map(|&h| layout_record(scene, h))
        .collect::<LayoutResult<Vec<_>>>()?;
    Ok(LayoutDocument { meta, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use card_scene::{Scene, card_plate};
    use card_transform::{Axis, Transform, quarter_turn};
    use card_types::{Point3, Vector3, box_mesh};

    #[test]
    fn record_reads_bounds_and_rotation() {
        let mut scene = Scene::new();
        let h = scene.add_mesh(
            "sword",
            Role::Accessory(1),
            box_mesh(Point3::new(-10.0, -2.0, 0.0), Point3::new(10.0, 2.0, 1.0)),
        );
        let placed = Transform::from_rotation(quarter_turn(Axis::Z, 1)).translated(Vector3::new(30.0, -5.0, 0.0));
        scene.set_transform(h, placed).unwrap();

        let before = scene.local_transform(h).unwrap();
        let rec = layout_record(&scene, h).unwrap();
        assert_eq!(scene.local_transform(h).unwrap(), before);

        assert_eq!(rec.role, "accessory");
        assert_eq!(rec.slot, Some(1));
        assert_relative_eq!(rec.center.x, 30.0, epsilon = 1e-12);
        assert_relative_eq!(rec.center.y, -5.0, epsilon = 1e-12);
        assert_relative_eq!(rec.size.w, 4.0, epsilon = 1e-12);
        assert_relative_eq!(rec.size.h, 20.0, epsilon = 1e-12);
        assert_relative_eq!(rec.rotation_z_deg, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn document_json_shape() {
        let spec = CardSpec::default();
        let plan = CardPlan::compute(&spec).unwrap();
        let mut scene = Scene::new();
        let card = scene.add_mesh("card", Role::Card, card_plate(spec.width, spec.height, spec.thickness, 5.0));
        let doc = serialize_layout(&scene, &[card], LayoutMeta::new("job-7", &spec, &plan)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["meta"]["units"], "mm");
        assert_eq!(value["meta"]["card"]["W"], 122.0);
        assert_eq!(value["meta"]["slots"]["text_strip"]["h"], 45.5);
        assert_eq!(value["items"][0]["name"], "card");
        assert_eq!(value["items"][0]["size"]["w"], 130.0);
        assert!(value["items"][0].get("slot").is_none());

        let back = LayoutDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back.items_with_role("card").count(), 1);
    }

    #[test]
    fn empty_group_is_recorded_at_its_origin() {
        let mut scene = Scene::new();
        let g = scene.add_group("text_group", Role::TextGroup, Point3::new(0.0, 70.0, 0.2));
        let rec = layout_record(&scene, g).unwrap();
        assert_eq!(rec.role, "text");
        assert_relative_eq!(rec.center.y, 70.0);
        assert_relative_eq!(rec.size.w, 0.0);
    }
}
