use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use layerwatch::{
    init_logging, Config, DefectHighlighter, HeightSource, LayerWindow, MoonrakerClient, Monitor,
    SilhouetteRenderer, StrokePolicy, BUILD_DATE, VERSION,
};
use layerwatch_vision::roi::binarize_mask;
use layerwatch_vision::{load_gray, polygon_mask};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "layerwatch")]
#[command(about = "Watch a 3D print against G-code silhouettes and milestone photos")]
#[command(version)]
struct Cli {
    /// Configuration file (.toml or .json); defaults to the platform config path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Stroke {
    Line,
    FilledBead,
}

impl From<Stroke> for StrokePolicy {
    fn from(stroke: Stroke) -> Self {
        match stroke {
            Stroke::Line => StrokePolicy::Line,
            Stroke::FilledBead => StrokePolicy::FilledBead,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render the XZ silhouette of a G-code file up to a layer.
    Render {
        /// G-code file
        #[arg(long)]
        gcode: PathBuf,

        /// Zero-based target layer; omit to render the whole file
        #[arg(long)]
        layer: Option<u32>,

        /// Output PNG
        #[arg(long)]
        out: PathBuf,

        /// Override the configured stroke policy
        #[arg(long, value_enum)]
        stroke: Option<Stroke>,

        /// Override the configured scale (px/mm)
        #[arg(long)]
        scale: Option<f64>,
    },

    /// Highlight deviations between a reference and a live photo.
    Diff {
        #[arg(long)]
        reference: PathBuf,

        #[arg(long)]
        live: PathBuf,

        /// Directory for Diff.png, Blur.png, Thresh.png and Canny.png
        #[arg(long)]
        out: PathBuf,

        /// Binary mask image; the configured ROI is used when omitted
        #[arg(long)]
        mask: Option<PathBuf>,
    },

    /// Print the milestone reference for a height or layer.
    Select {
        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        layer: Option<u32>,

        /// Match on layer first, then fall back to height
        #[arg(long)]
        prefer_layer: bool,
    },

    /// Poll the printer and compare each tick against the live photo.
    Watch {
        /// Live camera frame; overrides output.live_photo
        #[arg(long)]
        live: Option<PathBuf>,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match Config::default_path() {
            Ok(path) if path.is_file() => path,
            _ => {
                info!("No configuration file, using defaults");
                return Ok(Config::default());
            }
        },
    };
    let config = Config::load_from_file(&path)
        .with_context(|| format!("loading configuration {}", path.display()))?;
    info!("Loaded configuration {}", path.display());
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    info!("LayerWatch {} (built {})", VERSION, BUILD_DATE);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render {
            gcode,
            layer,
            out,
            stroke,
            scale,
        } => run_render(&config, &gcode, layer, &out, stroke, scale),

        Commands::Diff {
            reference,
            live,
            out,
            mask,
        } => run_diff(&config, &reference, &live, &out, mask.as_deref()),

        Commands::Select {
            height,
            layer,
            prefer_layer,
        } => run_select(&config, height, layer, prefer_layer),

        Commands::Watch { live, ticks } => run_watch(&config, live, ticks),
    }
}

fn run_render(
    config: &Config,
    gcode: &Path,
    layer: Option<u32>,
    out: &Path,
    stroke: Option<Stroke>,
    scale: Option<f64>,
) -> anyhow::Result<()> {
    let mut options = config.render;
    if let Some(stroke) = stroke {
        options = options.with_stroke(stroke.into());
    }
    if let Some(scale) = scale {
        options = options.with_scale(scale);
    }

    let mut renderer = SilhouetteRenderer::new(options)?;
    let silhouette = renderer
        .render_file(gcode, LayerWindow::from(layer))
        .with_context(|| format!("rendering {}", gcode.display()))?;
    silhouette.save(out)?;

    let info = &silhouette.info;
    println!(
        "{} segments, layer height {:.3} mm, z_max {:.3} mm, {}x{} px",
        info.segments_drawn, info.layer_h, info.z_max, info.width, info.height
    );
    Ok(())
}

fn run_diff(
    config: &Config,
    reference: &Path,
    live: &Path,
    out: &Path,
    mask_path: Option<&Path>,
) -> anyhow::Result<()> {
    let highlighter = DefectHighlighter::new(config.detection.detector())?;
    let reference_image = load_gray(reference)?;
    let live_image = load_gray(live)?;

    let (width, height) = reference_image.dimensions();
    let mask = match mask_path.or(config.detection.mask_image.as_deref()) {
        Some(path) => Some(binarize_mask(&load_gray(path)?)),
        None if config.detection.roi.is_empty() => None,
        None => Some(polygon_mask(width, height, &config.detection.roi)),
    };

    let stages = highlighter.highlight(&reference_image, &live_image, mask.as_ref())?;
    for path in stages.save_all(out)? {
        println!("{}", path.display());
    }
    println!(
        "otsu level {}, {} deviation pixels",
        stages.otsu_level,
        stages.deviation_pixels()
    );
    Ok(())
}

fn run_select(
    config: &Config,
    height: Option<f64>,
    layer: Option<u32>,
    prefer_layer: bool,
) -> anyhow::Result<()> {
    if height.is_none() && layer.is_none() {
        anyhow::bail!("give --height, --layer or both");
    }
    let strategy = if prefer_layer {
        layerwatch::SelectionStrategy::PreferLayer
    } else {
        config.milestones.strategy
    };

    match config.milestone_table().select(height, layer, strategy) {
        Some(path) => println!("{}", path.display()),
        None => println!("no match"),
    }
    Ok(())
}

fn run_watch(config: &Config, live: Option<PathBuf>, ticks: Option<u64>) -> anyhow::Result<()> {
    let live = live
        .or_else(|| config.output.live_photo.clone())
        .context("no live photo path; pass --live or set output.live_photo")?;
    if config.milestones.entries.is_empty() {
        warn!("Milestone table is empty; every tick will be skipped");
    }

    let monitor = Monitor::from_config(config)?;
    let client = MoonrakerClient::new(config.printer.moonraker())?;
    let period = Duration::from_millis(config.printer.poll_interval_ms);

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(async {
        info!("Watching {} every {:?}", client.url(), period);
        let source: &dyn HeightSource = &client;
        tokio::select! {
            compared = monitor.watch(source, &live, period, ticks, |report| {
                println!(
                    "{}\t{}\t{}",
                    report.output_dir.display(),
                    report.otsu_level,
                    report.deviation_pixels
                );
            }) => {
                info!("Finished with {} comparisons", compared);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
            }
        }
    });
    Ok(())
}
