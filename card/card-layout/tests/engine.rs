//! Engine-level scenarios over a whole card.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use approx::assert_relative_eq;
use card_layout::{
    CardPlan, CardSpec, FitParams, LayoutMeta, SnapParams, TextGroupParams, center_xy_at, compose_text_group, fit,
    rest_on_plane, select_orientation, serialize_layout, snap,
};
use card_scene::{AabbOracle, BlockTextFactory, EntityHandle, Scene, TextFactory, TextSpec, card_plate};
use card_types::{Point3, Rect, Role, box_mesh};

fn place(scene: &mut Scene, h: EntityHandle, card: EntityHandle, slot: Rect, margin: f64, depth: Option<f64>) -> f64 {
    scene.bake(h).unwrap();
    let choice = select_orientation(&*scene, h).unwrap();
    scene.set_transform(h, choice.transform).unwrap();

    let t = center_xy_at(&*scene, h, 0.0, 0.0).unwrap();
    scene.set_transform(h, t).unwrap();
    let t = rest_on_plane(&*scene, h, 0.0).unwrap();
    scene.set_transform(h, t).unwrap();

    let params = FitParams::new(slot.width, slot.height)
        .with_margin(margin)
        .with_target_depth(depth);
    let out = fit(&*scene, h, &params).unwrap();
    scene.set_transform(h, out.transform).unwrap();

    let t = center_xy_at(&*scene, h, slot.x_center, slot.y_center).unwrap();
    scene.set_transform(h, t).unwrap();
    let t = snap(&*scene, h, card, &SnapParams::default()).unwrap();
    scene.set_transform(h, t).unwrap();
    out.depth
}

#[test]
fn full_card_places_everything_inside_its_slot() {
    let spec = CardSpec::new(130.0, 190.0).with_upper_ratio(0.2);
    let plan = CardPlan::compute(&spec).unwrap();

    let mut scene = Scene::new();
    let card = scene.add_mesh(
        "card",
        Role::Card,
        card_plate(spec.width, spec.height, spec.thickness, spec.fillet_radius),
    );

    let factory = BlockTextFactory::default();
    let title = factory
        .create_text(&mut scene, "title", Role::Title, &TextSpec::new("STARTER", 14.0).with_extrude(0.8))
        .unwrap();
    let sub = factory
        .create_text(&mut scene, "subtitle", Role::Subtitle, &TextSpec::new("pack", 8.4).with_extrude(0.8))
        .unwrap();
    let text = compose_text_group(&mut scene, title, sub, &plan.text_strip, 0.0, &TextGroupParams::default()).unwrap();

    let figure = scene.add_mesh(
        "hero",
        Role::Figure,
        box_mesh(Point3::origin(), Point3::new(30.0, 20.0, 120.0)),
    );
    let depth = place(&mut scene, figure, card, plan.figure, 4.0, None);

    let mut accessories = Vec::new();
    for i in 0..3 {
        let h = scene.add_mesh(
            &format!("acc{i}"),
            Role::Accessory(i),
            box_mesh(Point3::origin(), Point3::new(5.0, 60.0, 10.0)),
        );
        let cell = plan.accessory_cell(i).unwrap();
        place(&mut scene, h, card, cell, 2.0, Some(depth));
        accessories.push((h, cell));
    }

    // Figure: stood up long axis is horizontal, inside the slot, resting on the card.
    let fig = scene.world_aabb(figure).unwrap();
    let fig_size = fig.size();
    assert!(fig_size.x >= fig_size.y && fig_size.y >= fig_size.z);
    assert!(plan.figure.contains(&fig.xy_rect(), 1e-9));
    assert_relative_eq!(fig.min.z, 0.0, epsilon = 1e-9);

    for (h, cell) in &accessories {
        let a = scene.world_aabb(*h).unwrap();
        assert!(cell.contains(&a.xy_rect(), 1e-9));
        assert!(a.size().z <= depth + 1e-9);
        assert_relative_eq!(a.min.z, 0.0, epsilon = 1e-9);
    }

    let t = scene.world_aabb(text.group).unwrap();
    assert!(plan.text_strip.contains(&t.xy_rect(), 1e-6));
    assert_relative_eq!(t.min.z, 0.2, epsilon = 1e-9);

    let mut placed = vec![card, figure];
    placed.extend(accessories.iter().map(|(h, _)| *h));
    placed.push(text.group);
    let doc = serialize_layout(&scene, &placed, LayoutMeta::new("scenario", &spec, &plan)).unwrap();
    let roles: Vec<&str> = doc.items.iter().map(|r| r.role.as_str()).collect();
    assert_eq!(roles, ["card", "figure", "accessory", "accessory", "accessory", "text"]);
    assert_relative_eq!(doc.meta.slots.text_strip.h, 182.0 * 0.2, epsilon = 1e-9);
}
