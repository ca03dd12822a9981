//! End-to-end job runs against STL fixtures on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use card_layout::{CardPlan, CardSpec, LayoutDocument};
use card_pipeline::{CARD_FILE, JobConfig, JobError, LAYOUT_FILE, RENDER_REQUEST_FILE, assembly_file, run_job};
use card_types::{Point3, Rect, Role, box_mesh};

fn write_box(dir: &Path, name: &str, size: (f64, f64, f64)) -> PathBuf {
    let path = dir.join(name);
    let mesh = box_mesh(Point3::origin(), Point3::new(size.0, size.1, size.2));
    card_io::save_stl(&mesh, &path, true).unwrap();
    path
}

fn footprint(doc: &LayoutDocument, role: &str) -> Vec<Rect> {
    doc.items_with_role(role)
        .map(|r| Rect::new(r.center.x, r.center.y, r.size.w, r.size.h))
        .collect()
}

struct Fixture {
    dir: tempfile::TempDir,
    figure: PathBuf,
    accessory: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let figure = write_box(dir.path(), "hero.stl", (10.0, 5.0, 20.0));
        let accessory = write_box(dir.path(), "sword.stl", (3.0, 2.0, 12.0));
        Self { dir, figure, accessory }
    }

    fn out(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    fn config(&self) -> JobConfig {
        JobConfig::new("t1", &self.figure)
            .with_title("HERO", "starter pack")
            .with_output_dir(self.out())
    }
}

#[test]
fn missing_accessory_is_skipped_and_the_rest_are_placed() {
    let fx = Fixture::new();
    let config = fx.config().with_accessories(vec![
        fx.accessory.clone(),
        fx.dir.path().join("missing.stl"),
        fx.accessory.clone(),
    ]);

    let report = run_job(&config).unwrap();
    assert_eq!(report.skipped_accessories, vec![1]);

    let doc = LayoutDocument::from_json(&std::fs::read_to_string(&report.layout_path).unwrap()).unwrap();
    assert_eq!(doc.items.len(), report.layout.items.len());
    let roles: Vec<&str> = doc.items.iter().map(|r| r.role.as_str()).collect();
    assert_eq!(roles, ["card", "figure", "accessory", "accessory", "text"]);
    let slots: Vec<Option<usize>> = doc.items_with_role("accessory").map(|r| r.slot).collect();
    assert_eq!(slots, [Some(0), Some(2)]);
    assert_eq!(doc.meta.job_id, "t1");
    assert_eq!(doc.meta.units, "mm");

    let plan = CardPlan::compute(&CardSpec::default()).unwrap();
    let figure = footprint(&doc, "figure");
    assert!(plan.figure.contains(&figure[0], 1e-6), "{figure:?} outside {:?}", plan.figure);
    let accessories = footprint(&doc, "accessory");
    assert!(plan.accessory_cells[0].contains(&accessories[0], 1e-6));
    assert!(plan.accessory_cells[2].contains(&accessories[1], 1e-6));
    let text = footprint(&doc, "text");
    assert!(plan.text_strip.contains(&text[0], 1e-6));

    assert!(fx.out().join(CARD_FILE).exists());
    assert!(fx.out().join(RENDER_REQUEST_FILE).exists());
    assert_eq!(report.artifacts.last().unwrap(), &report.layout_path);
}

#[test]
fn missing_figure_is_fatal_and_leaves_no_layout() {
    let fx = Fixture::new();
    let config = JobConfig::new("t2", fx.dir.path().join("nope.stl")).with_output_dir(fx.out());

    let err = run_job(&config).unwrap_err();
    assert!(matches!(err, JobError::AssetNotFound { role: Role::Figure, .. }));
    assert!(err.is_fatal());
    assert!(!fx.out().join(LAYOUT_FILE).exists());
}

#[test]
fn extra_accessories_are_truncated() {
    let fx = Fixture::new();
    let config = fx.config().with_accessories(vec![fx.accessory.clone(); 5]);

    let report = run_job(&config).unwrap();
    assert_eq!(report.layout.items_with_role("accessory").count(), 3);
    assert!(report.skipped_accessories.is_empty());
}

#[test]
fn assembly_export_holds_every_placed_part() {
    let fx = Fixture::new();
    let config = fx
        .config()
        .with_accessories(vec![fx.accessory.clone()])
        .with_export_assembly(true);

    run_job(&config).unwrap();
    let card = card_io::load_meshes(fx.out().join(CARD_FILE)).unwrap();
    let assembly = card_io::load_meshes(fx.out().join(assembly_file("t1"))).unwrap();
    // figure + accessory + text blocks, 12 faces per box
    assert!(assembly[0].mesh.face_count() >= card[0].mesh.face_count() + 24);
}

#[test]
fn invalid_card_is_rejected_before_any_output() {
    let fx = Fixture::new();
    let config = fx.config().with_card(CardSpec::new(-1.0, 190.0));

    assert!(matches!(run_job(&config), Err(JobError::Config { .. })));
    assert!(!fx.out().exists());
}

#[test]
fn corrupt_accessory_is_skipped() {
    let fx = Fixture::new();
    let corrupt = fx.dir.path().join("corrupt.stl");
    let mut bytes = vec![0u8; 80];
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 50]);
    std::fs::write(&corrupt, &bytes).unwrap();
    let config = fx.config().with_accessories(vec![corrupt, fx.accessory.clone()]);

    let report = run_job(&config).unwrap();
    assert_eq!(report.skipped_accessories, vec![0]);
    let slots: Vec<Option<usize>> = report.layout.items_with_role("accessory").map(|r| r.slot).collect();
    assert_eq!(slots, [Some(1)]);
    assert!(report.layout_path.exists());
}

#[test]
fn flat_figure_sets_no_depth_ceiling() {
    let fx = Fixture::new();
    let figure = write_box(fx.dir.path(), "decal.stl", (40.0, 30.0, 0.0));
    let big = write_box(fx.dir.path(), "banner.stl", (300.0, 200.0, 10.0));
    let config = JobConfig::new("flat", figure)
        .with_title("HERO", "starter pack")
        .with_output_dir(fx.out())
        .with_accessories(vec![big]);

    let report = run_job(&config).unwrap();
    let plan = CardPlan::compute(&CardSpec::default()).unwrap();
    let accessory = footprint(&report.layout, "accessory");
    assert_eq!(accessory.len(), 1);
    assert!(
        plan.accessory_cells[0].contains(&accessory[0], 1e-6),
        "{:?} outside {:?}",
        accessory[0],
        plan.accessory_cells[0]
    );
    assert_eq!(footprint(&report.layout, "figure").len(), 1);
}

#[test]
fn default_text_is_framed_for_render() {
    let fx = Fixture::new();
    let config = JobConfig::new("defaults", &fx.figure).with_output_dir(fx.out());

    let report = run_job(&config).unwrap();
    assert!(report.render.is_some());
    assert_eq!(report.layout.items_with_role("text").count(), 1);
}

#[cfg(unix)]
mod render_command {
    use super::*;

    fn sh(script: &str) -> Option<Vec<String>> {
        Some(vec!["sh".into(), "-c".into(), script.into()])
    }

    #[test]
    fn successful_render_keeps_artifacts() {
        let fx = Fixture::new();
        // The request path arrives as $0.
        let config = fx.config().with_render_command(sh(r#"test -f "$0""#));

        let report = run_job(&config).unwrap();
        assert!(report.render.is_some());
        assert!(fx.out().join(LAYOUT_FILE).exists());
    }

    #[test]
    fn failing_render_cleans_up() {
        let fx = Fixture::new();
        let config = fx.config().with_render_command(sh("echo no display >&2; exit 3"));

        match run_job(&config).unwrap_err() {
            JobError::ExternalProcessFailure { code, diagnostics, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(diagnostics, "no display");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!fx.out().join(CARD_FILE).exists());
        assert!(!fx.out().join(RENDER_REQUEST_FILE).exists());
        assert!(!fx.out().join(LAYOUT_FILE).exists());
    }

    #[test]
    fn render_timeout_is_fatal_and_cleans_up() {
        let fx = Fixture::new();
        let config = fx
            .config()
            .with_render_command(sh("exec sleep 30"))
            .with_timeout_secs(1);

        let err = run_job(&config).unwrap_err();
        assert!(matches!(err, JobError::ExternalProcessTimeout { timeout_secs: 1, .. }));
        assert!(!fx.out().join(CARD_FILE).exists());
        assert!(!fx.out().join(LAYOUT_FILE).exists());
    }
}
