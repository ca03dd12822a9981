//! `cardpack`: lay out a starter pack card from the command line.
//!
//! # Commands
//!
//! - `cardpack run --figure hero.stl -a sword.stl --title HERO` - run a job
//! - `cardpack run --config job.json --out-dir out` - run a job file, with overrides
//! - `cardpack plan --card-width 100` - print the slot rectangles
//!
//! Logging defaults to `info`; `RUST_LOG` or `-v`/`-vv` raise it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use card_layout::{CardPlan, CardSpec, FitMode, OrientationStrategy};
use card_pipeline::{JobConfig, run_job};

/// Starter pack card layout
#[derive(Parser)]
#[command(name = "cardpack")]
#[command(about = "Lay out figure, accessories and text on a printable card", long_about = None)]
#[command(version)]
struct Cli {
    /// More logging (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a card job
    Run(RunArgs),

    /// Print the slot rectangles for a card
    Plan {
        #[command(flatten)]
        card: CardArgs,
    },
}

#[derive(Args)]
struct CardArgs {
    /// Card width in mm
    #[arg(long)]
    card_width: Option<f64>,
    /// Card height in mm
    #[arg(long)]
    card_height: Option<f64>,
    /// Card thickness in mm
    #[arg(long)]
    card_thickness: Option<f64>,
    /// Fraction of the height given to the text strip
    #[arg(long)]
    upper_ratio: Option<f64>,
    /// Inset from the card edge in mm
    #[arg(long)]
    padding: Option<f64>,
    /// Corner radius in mm
    #[arg(long)]
    fillet: Option<f64>,
}

impl CardArgs {
    fn apply(&self, spec: &mut CardSpec) {
        let fields = [
            (self.card_width, &mut spec.width),
            (self.card_height, &mut spec.height),
            (self.card_thickness, &mut spec.thickness),
            (self.upper_ratio, &mut spec.upper_ratio),
            (self.padding, &mut spec.padding),
            (self.fillet, &mut spec.fillet_radius),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    /// Score eleven quarter-turn candidates
    Search,
    /// Roll about X when the asset is taller than deep
    XRoll,
}

impl From<OrientationArg> for OrientationStrategy {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Search => Self::CandidateSearch,
            OrientationArg::XRoll => Self::XRoll,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FitArg {
    /// Multiply the current scale
    Compound,
    /// Set the scale from unit-scale geometry
    Replace,
}

impl From<FitArg> for FitMode {
    fn from(arg: FitArg) -> Self {
        match arg {
            FitArg::Compound => Self::Compound,
            FitArg::Replace => Self::Replace,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    /// Job file (JSON); flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Job identifier
    #[arg(long)]
    job_id: Option<String>,
    /// Figure asset (.stl or .obj)
    #[arg(long)]
    figure: Option<PathBuf>,
    /// Accessory asset, repeatable, top cell first
    #[arg(short = 'a', long = "accessory")]
    accessories: Vec<PathBuf>,
    /// Output directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    #[command(flatten)]
    card: CardArgs,
    /// Figure margin in mm
    #[arg(long)]
    margin_figure: Option<f64>,
    /// Accessory margin in mm
    #[arg(long)]
    margin_accessories: Option<f64>,

    /// Title line
    #[arg(long)]
    title: Option<String>,
    /// Subtitle line
    #[arg(long)]
    subtitle: Option<String>,
    /// Font file
    #[arg(long)]
    font: Option<PathBuf>,
    /// Title size
    #[arg(long)]
    title_size: Option<f64>,
    /// Total text height in mm
    #[arg(long)]
    text_height: Option<f64>,
    /// Gap between title and subtitle in mm
    #[arg(long)]
    text_gap: Option<f64>,

    /// Orientation strategy
    #[arg(long, value_enum)]
    orientation: Option<OrientationArg>,
    /// Fit mode
    #[arg(long, value_enum)]
    fit: Option<FitArg>,

    /// Also export every placed entity as one STL
    #[arg(long)]
    export_assembly: bool,
    /// Render program and arguments; the request file is appended
    #[arg(long, num_args = 1.., allow_hyphen_values = true)]
    render_command: Option<Vec<String>>,
    /// External process timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl RunArgs {
    fn into_config(self) -> Result<JobConfig> {
        let mut config = match &self.config {
            Some(path) => JobConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => JobConfig::default(),
        };
        if let Some(v) = self.job_id {
            config.job_id = v;
        }
        if let Some(v) = self.figure {
            config.figure = v;
        }
        if !self.accessories.is_empty() {
            config.accessories = self.accessories;
        }
        if let Some(v) = self.out_dir {
            config.output_dir = v;
        }
        self.card.apply(&mut config.card);
        if let Some(v) = self.margin_figure {
            config.margin_figure = v;
        }
        if let Some(v) = self.margin_accessories {
            config.margin_accessories = v;
        }
        if let Some(v) = self.title {
            config.title = v;
        }
        if let Some(v) = self.subtitle {
            config.subtitle = v;
        }
        if self.font.is_some() {
            config.font = self.font;
        }
        if let Some(v) = self.title_size {
            config.title_size = v;
        }
        if let Some(v) = self.text_height {
            config.text.target_height = v;
        }
        if let Some(v) = self.text_gap {
            config.text.gap = v;
        }
        if let Some(v) = self.orientation {
            config.orientation = v.into();
        }
        if let Some(v) = self.fit {
            config.fit_mode = v.into();
        }
        config.export_assembly |= self.export_assembly;
        if self.render_command.is_some() {
            config.render.command = self.render_command;
        }
        if let Some(v) = self.timeout {
            config.timeout_secs = v;
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            let config = args.into_config()?;
            let report = run_job(&config).with_context(|| format!("job {} failed", config.job_id))?;
            for path in &report.artifacts {
                println!("{}", path.display());
            }
            if !report.skipped_accessories.is_empty() {
                println!("skipped accessory slots: {:?}", report.skipped_accessories);
            }
        }
        Commands::Plan { card } => {
            let mut spec = CardSpec::default();
            card.apply(&mut spec);
            let plan = CardPlan::compute(&spec)?;
            for (name, r) in plan.slots() {
                println!(
                    "{name:<12} center ({:8.2}, {:8.2})  size {:7.2} x {:7.2}",
                    r.x_center, r.y_center, r.width, r.height
                );
            }
        }
    }
    Ok(())
}
