//! Job pipeline for starter pack cards.
//!
//! Ties the layout engine to real files: a [`JobConfig`] names the assets
//! and card, [`run_job`] imports, lays out and exports everything, and the
//! `cardpack` binary drives it from the command line.
//!
//! Outputs, all in the job's output directory:
//!
//! | File | Content |
//! |---|---|
//! | `card.stl` | the card plate |
//! | `assembly_<job_id>.stl` | every placed entity, when enabled |
//! | `text_group_render.json` | top-down render request for the text group |
//! | `text_group.png` | the render, when a render command is configured |
//! | `layout.json` | the layout, written last and only on success |
//!
//! # Example
//!
//! ```no_run
//! use card_pipeline::{JobConfig, run_job};
//!
//! let config = JobConfig::new("demo", "hero.stl")
//!     .with_accessories(vec!["sword.stl".into(), "shield.obj".into()])
//!     .with_title("HERO", "starter pack")
//!     .with_output_dir("out/demo");
//! let report = run_job(&config).unwrap();
//! println!("layout at {}", report.layout_path.display());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod config;
mod error;
mod external;
mod job;
mod render;

pub use config::{JobConfig, MAX_ACCESSORIES, RenderConfig, SUBTITLE_SCALE};
pub use error::{JobError, JobResult, Stage};
pub use external::{ExternalCommand, ProcessOutput, run_external};
pub use job::{
    ArtifactLedger, CARD_FILE, JobReport, LAYOUT_FILE, TEXT_RENDER_FILE, assembly_file, run_job, run_job_with,
};
pub use render::{CAMERA_LIFT, RENDER_REQUEST_FILE, RenderRequest};
