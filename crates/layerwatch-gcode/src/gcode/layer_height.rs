//! Layer height resolution
//!
//! Slicers usually record the layer height in a header comment. When they
//! do not, the height is inferred from the median of the positive Z jumps
//! seen while interpreting the file.

use layerwatch_core::constants::DEFAULT_LAYER_HEIGHT_MM;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Where a resolved layer height came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerHeightSource {
    /// `layer_height = ...` style annotation in the file
    Metadata,
    /// Median of positive Z deltas
    Inferred,
    /// Nothing usable; fixed fallback
    Default,
}

impl fmt::Display for LayerHeightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::Inferred => write!(f, "inferred"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A layer height in millimeters, always > 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerHeight {
    pub value: f64,
    pub source: LayerHeightSource,
}

impl LayerHeight {
    pub fn fallback(value: f64) -> Self {
        let value = if value > 0.0 {
            value
        } else {
            DEFAULT_LAYER_HEIGHT_MM
        };
        Self {
            value,
            source: LayerHeightSource::Default,
        }
    }
}

impl Default for LayerHeight {
    fn default() -> Self {
        Self::fallback(DEFAULT_LAYER_HEIGHT_MM)
    }
}

/// Find a layer height annotation such as `; layer_height = 0.2`.
///
/// Matching is case-insensitive and allows spaces, `-` or `_` between the
/// two words. Non-positive values are ignored.
pub fn metadata_layer_height(text: &str) -> Option<f64> {
    static LAYER_HEIGHT_REGEX: std::sync::OnceLock<Option<Regex>> = std::sync::OnceLock::new();
    let regex = LAYER_HEIGHT_REGEX
        .get_or_init(|| Regex::new(r"(?i)layer[\s_-]*height\s*[:=]\s*([0-9]*\.?[0-9]+)").ok())
        .as_ref()?;

    let captures = regex.captures(text)?;
    let value = captures.get(1)?.as_str().parse::<f64>().ok()?;
    (value > 0.0).then_some(value)
}

/// Median of a sample; even-sized samples average the two middle values
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Resolve the layer height for a file.
///
/// Metadata wins; otherwise the median of `z_deltas` (already filtered to
/// positive jumps); otherwise `fallback`.
pub fn resolve_layer_height(text: &str, z_deltas: &[f64], fallback: f64) -> LayerHeight {
    if let Some(value) = metadata_layer_height(text) {
        debug!("Layer height {:.3} mm from metadata", value);
        return LayerHeight {
            value,
            source: LayerHeightSource::Metadata,
        };
    }

    match median(z_deltas) {
        Some(value) if value > 0.0 => {
            debug!(
                "Layer height {:.3} mm inferred from {} Z deltas",
                value,
                z_deltas.len()
            );
            LayerHeight {
                value,
                source: LayerHeightSource::Inferred,
            }
        }
        _ => {
            debug!("No layer height found, using fallback {:.3} mm", fallback);
            LayerHeight::fallback(fallback)
        }
    }
}
