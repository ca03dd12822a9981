//! Job descriptor.
//!
//! A [`JobConfig`] is plain data: load it from JSON, override fields from
//! the command line, then [`JobConfig::validate`] before running.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use card_layout::{CardSpec, FitMode, OrientationStrategy, TextGroupParams};

use crate::error::{JobError, JobResult};

/// Accessory slots available on a card.
pub const MAX_ACCESSORIES: usize = card_layout::ACCESSORY_CELLS;

/// Subtitle size relative to the title when not set explicitly.
pub const SUBTITLE_SCALE: f64 = 0.6;

/// Text group render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Extra framing around the text group, as a fraction of its size.
    pub margin: f64,
    /// Pixels along the long side of the image.
    pub px: u32,
    /// Program and leading arguments; the request file path is appended.
    /// No command means the request is written but not executed.
    pub command: Option<Vec<String>>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            margin: 0.08,
            px: 1600,
            command: None,
        }
    }
}

/// Everything one card job needs.
///
/// # Example
///
/// ```
/// use card_pipeline::JobConfig;
///
/// let config = JobConfig::new("job-7", "hero.stl")
///     .with_accessories(vec!["sword.stl".into()])
///     .with_title("Hero", "Starter Pack");
/// assert!(config.validate().is_ok());
/// assert_eq!(config.subtitle_size(), 14.0 * 0.6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Identifier written into the layout and export names.
    pub job_id: String,
    /// Figure asset (required).
    pub figure: PathBuf,
    /// Accessory assets, top cell first. Entries past the third are ignored.
    pub accessories: Vec<PathBuf>,
    /// Where every artifact is written.
    pub output_dir: PathBuf,

    /// Card dimensions and partition.
    pub card: CardSpec,
    /// Margin around the figure inside its slot.
    pub margin_figure: f64,
    /// Margin around each accessory inside its cell.
    pub margin_accessories: f64,

    /// Upper text line.
    pub title: String,
    /// Lower text line.
    pub subtitle: String,
    /// Font file handed to the text factory.
    pub font: Option<PathBuf>,
    /// Title text size.
    pub title_size: f64,
    /// Subtitle text size; `title_size · 0.6` when unset.
    pub subtitle_size: Option<f64>,
    /// Text extrusion depth.
    pub text_extrude: f64,
    /// Text group stacking and placement.
    pub text: TextGroupParams,

    /// How assets are turned to face the viewer.
    pub orientation: OrientationStrategy,
    /// How fit factors combine with existing scale.
    pub fit_mode: FitMode,

    /// Also export every visible entity as one STL.
    pub export_assembly: bool,
    /// Text group render.
    pub render: RenderConfig,
    /// Budget for each external process, in seconds.
    pub timeout_secs: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            job_id: "job".to_string(),
            figure: PathBuf::new(),
            accessories: Vec::new(),
            output_dir: PathBuf::from("out"),
            card: CardSpec::default(),
            margin_figure: 4.0,
            margin_accessories: 2.0,
            title: "Starter Pack".to_string(),
            subtitle: "Designed by M3D".to_string(),
            font: None,
            title_size: 14.0,
            subtitle_size: None,
            text_extrude: 0.8,
            text: TextGroupParams::default(),
            orientation: OrientationStrategy::default(),
            fit_mode: FitMode::default(),
            export_assembly: false,
            render: RenderConfig::default(),
            timeout_secs: 300,
        }
    }
}

impl JobConfig {
    /// Defaults with a job id and figure.
    #[must_use]
    pub fn new(job_id: impl Into<String>, figure: impl Into<PathBuf>) -> Self {
        Self {
            job_id: job_id.into(),
            figure: figure.into(),
            ..Self::default()
        }
    }

    /// Read a JSON job file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`JobError::Io`] if the file cannot be read, [`JobError::Config`] if
    /// it is not a valid job.
    pub fn load<P: AsRef<Path>>(path: P) -> JobResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(JobError::io(path))?;
        serde_json::from_str(&text).map_err(|e| JobError::Config {
            reason: format!("{}: {e}", path.display()),
        })
    }

    /// Set the accessories.
    #[must_use]
    pub fn with_accessories(mut self, accessories: Vec<PathBuf>) -> Self {
        self.accessories = accessories;
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set both text lines.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        self.title = title.into();
        self.subtitle = subtitle.into();
        self
    }

    /// Set the card.
    #[must_use]
    pub const fn with_card(mut self, card: CardSpec) -> Self {
        self.card = card;
        self
    }

    /// Set the orientation strategy.
    #[must_use]
    pub const fn with_orientation(mut self, strategy: OrientationStrategy) -> Self {
        self.orientation = strategy;
        self
    }

    /// Enable or disable the assembly export.
    #[must_use]
    pub const fn with_export_assembly(mut self, enabled: bool) -> Self {
        self.export_assembly = enabled;
        self
    }

    /// Set the render command.
    #[must_use]
    pub fn with_render_command(mut self, command: Option<Vec<String>>) -> Self {
        self.render.command = command;
        self
    }

    /// Set the external process budget.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Effective subtitle size.
    #[must_use]
    pub fn subtitle_size(&self) -> f64 {
        self.subtitle_size.unwrap_or(self.title_size * SUBTITLE_SCALE)
    }

    /// Accessories that will be placed, in slot order.
    #[must_use]
    pub fn placed_accessories(&self) -> &[PathBuf] {
        &self.accessories[..self.accessories.len().min(MAX_ACCESSORIES)]
    }

    /// Check the job before any work is done.
    ///
    /// # Errors
    ///
    /// [`JobError::Config`] naming the first problem found.
    pub fn validate(&self) -> JobResult<()> {
        let fail = |reason: String| Err(JobError::Config { reason });

        if self.job_id.trim().is_empty() {
            return fail("job_id is empty".to_string());
        }
        if self.figure.as_os_str().is_empty() {
            return fail("no figure asset given".to_string());
        }
        self.card.validate().map_err(|e| JobError::Config { reason: e.to_string() })?;
        for (name, value) in [
            ("margin_figure", self.margin_figure),
            ("margin_accessories", self.margin_accessories),
            ("text.gap", self.text.gap),
            ("text.lift", self.text.lift),
            ("render.margin", self.render.margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return fail(format!("{name} must be non-negative, got {value}"));
            }
        }
        for (name, value) in [
            ("title_size", self.title_size),
            ("subtitle_size", self.subtitle_size()),
            ("text_extrude", self.text_extrude),
            ("text.target_height", self.text.target_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return fail(format!("{name} must be positive, got {value}"));
            }
        }
        if self.render.px == 0 {
            return fail("render.px must be at least 1".to_string());
        }
        if self.render.command.as_ref().is_some_and(Vec::is_empty) {
            return fail("render.command is empty".to_string());
        }
        if self.timeout_secs == 0 {
            return fail("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }
}
