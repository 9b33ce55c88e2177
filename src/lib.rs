//! # LayerWatch
//!
//! Watches a 3D print for defects by comparing what the slicer intended
//! against what a camera sees.
//!
//! ## Architecture
//!
//! LayerWatch is organized as a workspace with multiple crates:
//!
//! 1. **layerwatch-core** - Position model, constants, error hierarchy
//! 2. **layerwatch-gcode** - G-code interpreter and XZ silhouette renderer
//! 3. **layerwatch-vision** - Milestone selection, ROI masks, defect pipeline
//! 4. **layerwatch-communication** - Moonraker height polling
//! 5. **layerwatch-settings** - JSON/TOML configuration
//! 6. **layerwatch** - Monitor loop and the command line binary

pub mod monitor;

pub use layerwatch_core::{Error, GcodeError, Position, Result, StatusError, VisionError, XzPoint};

pub use layerwatch_gcode::{
    parse_toolpath, render_silhouette, LayerHeight, LayerHeightSource, LayerWindow,
    ParsedToolpath, RenderInfo, RenderOptions, Silhouette, SilhouetteRenderer, StrokePolicy,
};

pub use layerwatch_vision::{
    polygon_mask, DefectHighlighter, DefectStages, DetectorConfig, HeightLayerConverter,
    Milestone, MilestoneTable, SelectionStrategy,
};

pub use layerwatch_communication::{FixedHeight, HeightSource, MoonrakerClient, MoonrakerConfig};

pub use layerwatch_settings::Config;

pub use monitor::{MaskSource, Monitor, TickReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
