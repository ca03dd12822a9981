//! One card job, end to end.
//!
//! Stages run in a fixed order on a single [`Scene`]:
//!
//! 1. plan the slots and build the card plate
//! 2. create, stack and place the title/subtitle group
//! 3. import and place the figure (fatal when missing)
//! 4. import and place up to three accessories (missing ones are skipped)
//! 5. export meshes, write and optionally execute the render request
//! 6. write the layout file
//!
//! Every file written is recorded in an [`ArtifactLedger`]. A fatal error
//! removes them all, so a failed job leaves no layout behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use card_layout::{
    CardPlan, FitParams, LayoutDocument, LayoutMeta, LayoutResult, SnapParams, center_xy_at, compose_text_group,
    fit, orient, rest_on_plane, serialize_layout, snap,
};
use card_scene::{AabbOracle, BlockTextFactory, EntityHandle, Scene, TextFactory, TextSpec, card_plate};
use card_transform::Transform;
use card_types::{DEGENERATE_EXTENT, Mesh, Rect, Rgba, Role};

use crate::config::{JobConfig, MAX_ACCESSORIES};
use crate::error::{JobError, JobResult, Stage};
use crate::external::{ExternalCommand, run_external};
use crate::render::{RENDER_REQUEST_FILE, RenderRequest};

/// Layout file name inside the output directory.
pub const LAYOUT_FILE: &str = "layout.json";

/// Card plate export name.
pub const CARD_FILE: &str = "card.stl";

/// Rendered text group image name.
pub const TEXT_RENDER_FILE: &str = "text_group.png";

/// Assembly export name for a job.
#[must_use]
pub fn assembly_file(job_id: &str) -> String {
    format!("assembly_{job_id}.stl")
}

/// Files written by a job, removed again if it fails.
#[derive(Debug, Default)]
pub struct ArtifactLedger {
    paths: Vec<PathBuf>,
}

impl ArtifactLedger {
    /// An empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a file some other party will write.
    pub fn record(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    /// Every tracked path, in write order.
    #[must_use]
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Write `bytes` to `path` and track it.
    ///
    /// # Errors
    ///
    /// [`JobError::Io`] if the file cannot be written.
    pub fn write(&mut self, path: &Path, bytes: &[u8]) -> JobResult<()> {
        self.record(path);
        let mut file = File::create(path).map_err(JobError::io(path))?;
        file.write_all(bytes).map_err(JobError::io(path))
    }

    /// Save `mesh` as binary STL and track it.
    ///
    /// # Errors
    ///
    /// [`JobError::Export`] if writing fails.
    pub fn save_stl(&mut self, mesh: &Mesh, path: &Path) -> JobResult<()> {
        self.record(path);
        card_io::save_stl(mesh, path, true).map_err(|source| JobError::Export {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Delete every tracked file that exists. Failures are logged, not returned.
    pub fn cleanup(&mut self) {
        for path in self.paths.drain(..).rev() {
            if !path.exists() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => debug!("removed {}", path.display()),
                Err(e) => warn!("could not remove {}: {e}", path.display()),
            }
        }
    }

    fn into_paths(self) -> Vec<PathBuf> {
        self.paths
    }
}

/// What a successful job produced.
#[derive(Debug, Clone)]
pub struct JobReport {
    /// The layout file.
    pub layout_path: PathBuf,
    /// Its content.
    pub layout: LayoutDocument,
    /// Every file written, layout last.
    pub artifacts: Vec<PathBuf>,
    /// Accessory indices that were skipped.
    pub skipped_accessories: Vec<usize>,
    /// The text group render request, unless the group had no extent.
    pub render: Option<RenderRequest>,
}

/// Run a job with the bundled block text.
///
/// # Errors
///
/// See [`run_job_with`].
pub fn run_job(config: &JobConfig) -> JobResult<JobReport> {
    run_job_with(config, &BlockTextFactory::default())
}

/// Run a job with a caller-supplied text factory.
///
/// # Errors
///
/// Any fatal [`JobError`]. By the time it is returned every file the job
/// wrote has been removed.
pub fn run_job_with(config: &JobConfig, text: &dyn TextFactory) -> JobResult<JobReport> {
    config.validate()?;
    fs::create_dir_all(&config.output_dir).map_err(JobError::io(&config.output_dir))?;
    info!("job {}: output to {}", config.job_id, config.output_dir.display());

    let mut ledger = ArtifactLedger::new();
    match execute(config, text, &mut ledger) {
        Ok((layout, skipped, render)) => {
            let layout_path = config.output_dir.join(LAYOUT_FILE);
            info!(
                "job {} done: {} items, {} accessory(ies) skipped",
                config.job_id,
                layout.items.len(),
                skipped.len()
            );
            Ok(JobReport {
                layout_path,
                layout,
                artifacts: ledger.into_paths(),
                skipped_accessories: skipped,
                render,
            })
        }
        Err(e) => {
            warn!("job {} failed: {e}; removing {} file(s)", config.job_id, ledger.paths().len());
            ledger.cleanup();
            Err(e)
        }
    }
}

type Executed = (LayoutDocument, Vec<usize>, Option<RenderRequest>);

fn execute(config: &JobConfig, text: &dyn TextFactory, ledger: &mut ArtifactLedger) -> JobResult<Executed> {
    let plan = CardPlan::compute(&config.card).map_err(JobError::layout(Stage::Card))?;
    let mut scene = Scene::new();

    let spec = &config.card;
    let card = scene.add_mesh(
        "card",
        Role::Card,
        card_plate(spec.width, spec.height, spec.thickness, spec.fillet_radius),
    );
    scene.set_material(card, Rgba::CARD_GREY).map_err(JobError::scene(Stage::Card))?;
    scene.bake(card).map_err(JobError::scene(Stage::Card))?;
    let card_top = scene.world_aabb(card).map_err(JobError::scene(Stage::Card))?.max.z;
    info!("card {}x{}x{} mm planned", spec.width, spec.height, spec.thickness);

    let text_group = place_text(&mut scene, config, text, &plan.text_strip, card_top)?;

    let figure = import(&mut scene, &config.figure, Role::Figure)?;
    let figure_depth = place_asset(
        &mut scene,
        config,
        Stage::Figure,
        figure,
        card,
        &plan.figure,
        config.margin_figure,
        None,
    )?;

    if config.accessories.len() > MAX_ACCESSORIES {
        warn!(
            "{} accessories given, only the first {MAX_ACCESSORIES} are placed",
            config.accessories.len()
        );
    }
    let mut placed = Vec::new();
    let mut skipped = Vec::new();
    for (i, path) in config.placed_accessories().iter().enumerate() {
        let handle = match import(&mut scene, path, Role::Accessory(i)) {
            Ok(h) => h,
            Err(e) if !e.is_fatal() => {
                warn!("skipping accessory slot {i}: {e}");
                skipped.push(i);
                continue;
            }
            Err(e) => return Err(e),
        };
        let Some(cell) = plan.accessory_cell(i) else {
            skipped.push(i);
            continue;
        };
        place_asset(
            &mut scene,
            config,
            Stage::Accessory(i),
            handle,
            card,
            &cell,
            config.margin_accessories,
            figure_depth,
        )?;
        placed.push(handle);
    }

    export(&scene, config, card, ledger)?;
    let render = render_text(&scene, config, text_group, ledger)?;

    let mut order = vec![card, figure];
    order.extend(placed);
    order.push(text_group);
    let meta = LayoutMeta::new(config.job_id.clone(), spec, &plan);
    let layout = serialize_layout(&scene, &order, meta).map_err(JobError::layout(Stage::Serialize))?;
    let json = layout.to_json()?;
    ledger.write(&config.output_dir.join(LAYOUT_FILE), json.as_bytes())?;

    Ok((layout, skipped, render))
}

fn import(scene: &mut Scene, path: &Path, role: Role) -> JobResult<EntityHandle> {
    scene
        .import(path, role)
        .map(|imported| imported.primary)
        .map_err(|e| JobError::import(role, path.to_path_buf(), e))
}

/// Commit a proposed transform, or log and keep the current one when the
/// step hit a recoverable condition.
fn commit(
    scene: &mut Scene,
    stage: Stage,
    handle: EntityHandle,
    step: &str,
    proposed: LayoutResult<Transform>,
) -> JobResult<()> {
    match proposed {
        Ok(t) => scene.set_transform(handle, t).map_err(JobError::scene(stage)),
        Err(e) if e.is_recoverable() => {
            warn!("{stage}: {step} skipped: {e}");
            Ok(())
        }
        Err(e) => Err(JobError::layout(stage)(e)),
    }
}

/// Orient, normalize, fit, center in `slot` and snap onto the card.
///
/// Returns the fitted depth, or `None` when the asset was too thin to fit
/// or ended up flat.
#[allow(clippy::too_many_arguments)]
fn place_asset(
    scene: &mut Scene,
    config: &JobConfig,
    stage: Stage,
    handle: EntityHandle,
    card: EntityHandle,
    slot: &Rect,
    margin: f64,
    depth_ceiling: Option<f64>,
) -> JobResult<Option<f64>> {
    scene.bake(handle).map_err(JobError::scene(stage))?;

    let choice = orient(&*scene, handle, config.orientation).map(|c| {
        debug!("{stage}: orientation {} (score {:.3})", c.candidate, c.score);
        c.transform
    });
    commit(scene, stage, handle, "orientation", choice)?;

    let centered = center_xy_at(&*scene, handle, 0.0, 0.0);
    commit(scene, stage, handle, "centering", centered)?;
    let rested = rest_on_plane(&*scene, handle, 0.0);
    commit(scene, stage, handle, "resting", rested)?;

    let params = FitParams::new(slot.width, slot.height)
        .with_margin(margin)
        .with_target_depth(depth_ceiling)
        .with_mode(config.fit_mode);
    let outcome = fit(&*scene, handle, &params).map_err(JobError::layout(stage))?;
    let depth = if outcome.degenerate {
        warn!("{stage}: too thin to fit, left at its imported size");
        None
    } else {
        scene
            .set_transform(handle, outcome.transform)
            .map_err(JobError::scene(stage))?;
        debug!("{stage}: scaled by {:.4}, depth {:.3}", outcome.factor, outcome.depth);
        if outcome.depth < DEGENERATE_EXTENT {
            warn!("{stage}: flat after fitting, no depth ceiling for later assets");
            None
        } else {
            Some(outcome.depth)
        }
    };

    let moved = center_xy_at(&*scene, handle, slot.x_center, slot.y_center);
    commit(scene, stage, handle, "slot centering", moved)?;
    let snapped = snap(&*scene, handle, card, &SnapParams::default());
    commit(scene, stage, handle, "snap", snapped)?;

    info!("{stage}: placed at ({:.2}, {:.2})", slot.x_center, slot.y_center);
    Ok(depth)
}

fn place_text(
    scene: &mut Scene,
    config: &JobConfig,
    factory: &dyn TextFactory,
    strip: &Rect,
    card_top: f64,
) -> JobResult<EntityHandle> {
    if config.title.trim().is_empty() && config.subtitle.trim().is_empty() {
        warn!("title and subtitle are both empty; the text group will have no geometry");
    }
    let lines = [
        ("title", Role::Title, config.title.as_str(), config.title_size),
        ("subtitle", Role::Subtitle, config.subtitle.as_str(), config.subtitle_size()),
    ];
    let mut handles = Vec::with_capacity(lines.len());
    for (name, role, body, size) in lines {
        let spec = TextSpec::new(body, size)
            .with_extrude(config.text_extrude)
            .with_font(config.font.clone());
        let h = factory
            .create_text(scene, name, role, &spec)
            .map_err(JobError::scene(Stage::Text))?;
        scene.set_material(h, Rgba::RED).map_err(JobError::scene(Stage::Text))?;
        handles.push(h);
    }

    let outcome = compose_text_group(scene, handles[0], handles[1], strip, card_top, &config.text)
        .map_err(JobError::layout(Stage::Text))?;
    info!(
        "text group stacked at {:.2} mm, scaled by {:.4}",
        outcome.stacked_height, outcome.factor
    );
    Ok(outcome.group)
}

fn export(scene: &Scene, config: &JobConfig, card: EntityHandle, ledger: &mut ArtifactLedger) -> JobResult<()> {
    let card_mesh = scene
        .world_mesh(card)
        .map_err(JobError::scene(Stage::Export))?
        .unwrap_or_default();
    let card_path = config.output_dir.join(CARD_FILE);
    ledger.save_stl(&card_mesh, &card_path)?;
    info!("exported {}", card_path.display());

    if config.export_assembly {
        let assembly = scene
            .merged_world_mesh(|e| e.role() != Role::Auxiliary)
            .map_err(JobError::scene(Stage::Export))?;
        let path = config.output_dir.join(assembly_file(&config.job_id));
        ledger.save_stl(&assembly, &path)?;
        info!("exported {} ({} faces)", path.display(), assembly.face_count());
    }
    Ok(())
}

fn render_text(
    scene: &Scene,
    config: &JobConfig,
    group: EntityHandle,
    ledger: &mut ArtifactLedger,
) -> JobResult<Option<RenderRequest>> {
    let aabb = scene.world_aabb(group).map_err(JobError::scene(Stage::Render))?;
    let name = scene.name(group).map_err(JobError::scene(Stage::Render))?;
    let output = config.output_dir.join(TEXT_RENDER_FILE);
    let Some(request) = RenderRequest::frame(name, &aabb, config.render.margin, config.render.px, Rgba::RED, output)
    else {
        warn!("text group has no XY extent, render skipped");
        return Ok(None);
    };

    let request_path = config.output_dir.join(RENDER_REQUEST_FILE);
    let json = serde_json::to_string_pretty(&request)?;
    ledger.write(&request_path, json.as_bytes())?;
    debug!(
        "render request {}x{} px, ortho scale {:.3}",
        request.resolution_x, request.resolution_y, request.ortho_scale
    );

    if let Some((program, args)) = config.render.command.as_ref().and_then(|c| c.split_first()) {
        ledger.record(&request.output);
        let cmd = ExternalCommand::new(Stage::Render, program.clone(), Duration::from_secs(config.timeout_secs))
            .args(args.iter().cloned())
            .arg(request_path.to_string_lossy().into_owned());
        run_external(&cmd)?;
        info!("rendered {}", request.output.display());
    }
    Ok(Some(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_cleanup_removes_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ArtifactLedger::new();
        let a = dir.path().join("a.json");
        ledger.write(&a, b"{}").unwrap();
        ledger.record(dir.path().join("never-written.png"));
        assert!(a.exists());
        assert_eq!(ledger.paths().len(), 2);

        ledger.cleanup();
        assert!(!a.exists());
        assert!(ledger.paths().is_empty());
    }

    #[test]
    fn assembly_name_includes_job() {
        assert_eq!(assembly_file("j42"), "assembly_j42.stl");
    }
}
