//! Silhouette render options

use layerwatch_core::constants::{
    DEFAULT_BED_WIDTH_MM, DEFAULT_LAYER_HEIGHT_MM, DEFAULT_SCALE_PX_PER_MM, WINDOW_EPSILON_MM,
    Z_DELTA_EPSILON_MM,
};
use layerwatch_core::GcodeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How each segment is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokePolicy {
    /// Centerline stroke, one layer thick
    Line,
    /// Axis-aligned rectangle per segment, giving a solid silhouette
    #[default]
    FilledBead,
}

impl fmt::Display for StrokePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => write!(f, "line"),
            Self::FilledBead => write!(f, "filled_bead"),
        }
    }
}

/// Physical-to-pixel mapping and windowing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Bed width along X; X coordinates are clamped to `[0, bed_width_mm]`
    pub bed_width_mm: f64,
    /// Pixels per millimeter
    pub scale_px_per_mm: f64,
    /// Slack on the layer window top
    pub window_epsilon: f64,
    /// Z jumps at or below this are not layer changes
    pub z_delta_epsilon: f64,
    /// Layer height used when the file yields none
    pub fallback_layer_height: f64,
    /// Stroke policy
    pub stroke: StrokePolicy,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            bed_width_mm: DEFAULT_BED_WIDTH_MM,
            scale_px_per_mm: DEFAULT_SCALE_PX_PER_MM,
            window_epsilon: WINDOW_EPSILON_MM,
            z_delta_epsilon: Z_DELTA_EPSILON_MM,
            fallback_layer_height: DEFAULT_LAYER_HEIGHT_MM,
            stroke: StrokePolicy::default(),
        }
    }
}

impl RenderOptions {
    pub fn with_stroke(mut self, stroke: StrokePolicy) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn with_scale(mut self, scale_px_per_mm: f64) -> Self {
        self.scale_px_per_mm = scale_px_per_mm;
        self
    }

    pub fn with_bed_width(mut self, bed_width_mm: f64) -> Self {
        self.bed_width_mm = bed_width_mm;
        self
    }

    /// Check that the options describe a drawable canvas
    pub fn validate(&self) -> Result<(), GcodeError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.bed_width_mm) {
            return Err(GcodeError::InvalidRenderOptions {
                reason: format!("bed width must be > 0, got {}", self.bed_width_mm),
            });
        }
        if !positive(self.scale_px_per_mm) {
            return Err(GcodeError::InvalidRenderOptions {
                reason: format!("scale must be > 0, got {}", self.scale_px_per_mm),
            });
        }
        if !self.window_epsilon.is_finite() || self.window_epsilon < 0.0 {
            return Err(GcodeError::InvalidRenderOptions {
                reason: format!("window epsilon must be >= 0, got {}", self.window_epsilon),
            });
        }
        if !self.z_delta_epsilon.is_finite() || self.z_delta_epsilon < 0.0 {
            return Err(GcodeError::InvalidRenderOptions {
                reason: format!("z delta epsilon must be >= 0, got {}", self.z_delta_epsilon),
            });
        }
        Ok(())
    }

    /// Canvas width in pixels, at least 1
    pub fn canvas_width(&self) -> u32 {
        to_pixel_extent(self.bed_width_mm * self.scale_px_per_mm)
    }
}

/// Round a pixel extent (halves to even), never below 1
pub(crate) fn to_pixel_extent(value: f64) -> u32 {
    let rounded = value.round_ties_even();
    if !rounded.is_finite() || rounded < 1.0 {
        1
    } else if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.bed_width_mm, 245.0);
        assert_eq!(options.scale_px_per_mm, 8.0);
        assert_eq!(options.stroke, StrokePolicy::FilledBead);
        assert_eq!(options.canvas_width(), 1960);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let options = RenderOptions::default().with_scale(0.0);
        assert!(options.validate().is_err());
        let options = RenderOptions::default().with_bed_width(f64::NAN);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_pixel_extent_never_zero() {
        assert_eq!(to_pixel_extent(0.0), 1);
        assert_eq!(to_pixel_extent(0.4), 1);
        assert_eq!(to_pixel_extent(3.2), 3);
        assert_eq!(to_pixel_extent(3.5), 4);
        assert_eq!(to_pixel_extent(2.5), 2);
    }

    #[test]
    fn test_stroke_policy_display() {
        assert_eq!(StrokePolicy::FilledBead.to_string(), "filled_bead");
        assert_eq!(StrokePolicy::Line.to_string(), "line");
    }
}
