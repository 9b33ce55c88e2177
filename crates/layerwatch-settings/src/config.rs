//! Configuration file handling for LayerWatch
//!
//! One file, JSON or TOML, covers every overridable constant. Sections:
//! - `render`: bed width, pixel scale, epsilons, stroke policy
//! - `layers`: first layer and nominal layer height
//! - `milestones`: tolerance, strategy and the ordered milestone table
//! - `detection`: median kernel, edge thresholds and the ROI
//! - `printer`: Moonraker address, timeout and polling interval
//! - `output`: where stage images go and where the live photo is read

use layerwatch_communication::MoonrakerConfig;
use layerwatch_core::constants::{
    DEFAULT_CANNY_HIGH, DEFAULT_CANNY_LOW, DEFAULT_FIRST_LAYER_HEIGHT_MM, DEFAULT_LAYER_HEIGHT_MM,
    DEFAULT_MEDIAN_KERNEL, DEFAULT_MILESTONE_TOLERANCE_MM, DEFAULT_MOONRAKER_PORT,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_STATUS_TIMEOUT_MS,
};
use layerwatch_gcode::RenderOptions;
use layerwatch_vision::{
    DetectorConfig, HeightLayerConverter, Milestone, MilestoneTable, PixelVertex,
    SelectionStrategy,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Height to layer conversion parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    /// Z of the first printed layer
    pub first_layer_height: f64,
    /// Nominal layer height
    pub layer_height: f64,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            first_layer_height: DEFAULT_FIRST_LAYER_HEIGHT_MM,
            layer_height: DEFAULT_LAYER_HEIGHT_MM,
        }
    }
}

impl LayerSettings {
    pub fn converter(&self) -> HeightLayerConverter {
        HeightLayerConverter::new(self.first_layer_height, self.layer_height)
    }
}

/// Milestone table settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MilestoneSettings {
    /// Match window around each target height
    pub tolerance: f64,
    /// Height matching, or layer matching first
    pub strategy: SelectionStrategy,
    /// Ordered milestones; the first match wins
    pub entries: Vec<Milestone>,
}

impl Default for MilestoneSettings {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_MILESTONE_TOLERANCE_MM,
            strategy: SelectionStrategy::default(),
            entries: Vec::new(),
        }
    }
}

/// Defect detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Median filter kernel edge length (odd)
    pub median_kernel: u32,
    /// Edge detector low threshold
    pub canny_low: f32,
    /// Edge detector high threshold
    pub canny_high: f32,
    /// Pre-drawn mask image; takes precedence over `roi`
    pub mask_image: Option<PathBuf>,
    /// ROI polygon in reference pixel coordinates; empty means full frame
    pub roi: Vec<PixelVertex>,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            median_kernel: DEFAULT_MEDIAN_KERNEL,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            mask_image: None,
            roi: Vec::new(),
        }
    }
}

impl DetectionSettings {
    pub fn detector(&self) -> DetectorConfig {
        DetectorConfig {
            median_kernel: self.median_kernel,
            canny_low: self.canny_low,
            canny_high: self.canny_high,
        }
    }
}

/// Printer status polling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterSettings {
    /// Moonraker host name or address
    pub host: String,
    /// Moonraker port
    pub port: u16,
    /// Status request timeout in milliseconds
    pub timeout_ms: u64,
    /// Interval between monitor ticks in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_MOONRAKER_PORT,
            timeout_ms: DEFAULT_STATUS_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl PrinterSettings {
    pub fn moonraker(&self) -> MoonrakerConfig {
        MoonrakerConfig {
            host: self.host.clone(),
            port: self.port,
            timeout_ms: self.timeout_ms,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Root directory for per-tick stage images
    pub dir: PathBuf,
    /// Live camera frame, overwritten by the capture process
    pub live_photo: Option<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("layerwatch-output"),
            live_photo: None,
        }
    }
}

/// Complete LayerWatch configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Silhouette rendering
    pub render: RenderOptions,
    /// Height to layer conversion
    pub layers: LayerSettings,
    /// Milestone table
    pub milestones: MilestoneSettings,
    /// Defect detection
    pub detection: DetectionSettings,
    /// Printer polling
    pub printer: PrinterSettings,
    /// Output locations
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into()),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config location, e.g. `~/.config/layerwatch/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform("no configuration directory".to_string())
        })?;
        Ok(dir.join("layerwatch").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| SettingsError::SaveError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.render
            .validate()
            .map_err(|e| SettingsError::invalid("render", e.to_string()))?;

        if !(self.layers.layer_height > 0.0) {
            return Err(SettingsError::invalid(
                "layers.layer_height",
                format!("must be > 0, got {}", self.layers.layer_height),
            ));
        }
        if !self.layers.first_layer_height.is_finite() {
            return Err(SettingsError::invalid(
                "layers.first_layer_height",
                "must be finite",
            ));
        }

        if !(self.milestones.tolerance >= 0.0) {
            return Err(SettingsError::invalid(
                "milestones.tolerance",
                format!("must be >= 0, got {}", self.milestones.tolerance),
            ));
        }
        if let Some(m) = self
            .milestones
            .entries
            .iter()
            .find(|m| !m.target_height.is_finite())
        {
            return Err(SettingsError::invalid(
                "milestones.entries",
                format!("non-finite target height for {}", m.reference.display()),
            ));
        }

        self.detection
            .detector()
            .validate()
            .map_err(|e| SettingsError::invalid("detection", e.to_string()))?;

        if self.printer.host.trim().is_empty() {
            return Err(SettingsError::invalid("printer.host", "must not be empty"));
        }
        if self.printer.port == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "printer.port".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.printer.timeout_ms == 0 {
            return Err(SettingsError::invalid("printer.timeout_ms", "must be > 0"));
        }
        if self.printer.poll_interval_ms == 0 {
            return Err(SettingsError::invalid(
                "printer.poll_interval_ms",
                "must be > 0",
            ));
        }

        Ok(())
    }

    /// Milestone table with this config's tolerance and layer conversion
    pub fn milestone_table(&self) -> MilestoneTable {
        MilestoneTable::new(self.milestones.entries.clone())
            .with_tolerance(self.milestones.tolerance)
            .with_converter(self.layers.converter())
    }
}
