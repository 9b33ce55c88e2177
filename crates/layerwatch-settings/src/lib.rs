//! LayerWatch Settings Crate
//!
//! Loads, validates and saves the single configuration file that drives
//! rendering, milestone selection, defect detection and printer polling.

pub mod config;
pub mod error;

pub use config::{
    Config, DetectionSettings, LayerSettings, MilestoneSettings, OutputSettings, PrinterSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
