//! Defect highlighting
//!
//! Compares a reference photo with a live photo of the print and keeps
//! every intermediate stage, since a misclassification is diagnosed by
//! looking at where the stages disagree:
//!
//! 1. `difference`: `|reference - live|`, zeroed outside the ROI mask
//! 2. `blurred`: median-filtered difference
//! 3. `threshold`: Otsu binarization of the blurred difference
//! 4. `edges`: Canny contours of the threshold mask

use image::GrayImage;
use layerwatch_core::constants::{
    DEFAULT_CANNY_HIGH, DEFAULT_CANNY_LOW, DEFAULT_MEDIAN_KERNEL, MAX_MEDIAN_KERNEL,
};
use layerwatch_core::VisionError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::filters::{
    absdiff, apply_mask, canny, count_foreground, median_filter, otsu_level, resize_area,
    threshold_above,
};
use crate::io::{load_gray, save_gray};

/// File names used by [`DefectStages::save_all`], in stage order
pub const STAGE_FILE_NAMES: [&str; 4] = ["Diff.png", "Blur.png", "Thresh.png", "Canny.png"];

/// Defect pipeline parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Median filter kernel edge length, odd
    pub median_kernel: u32,
    /// Hysteresis low threshold
    pub canny_low: f32,
    /// Hysteresis high threshold
    pub canny_high: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            median_kernel: DEFAULT_MEDIAN_KERNEL,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), VisionError> {
        if self.median_kernel == 0 || self.median_kernel % 2 == 0 {
            return Err(VisionError::InvalidConfig {
                reason: format!("median kernel must be odd, got {}", self.median_kernel),
            });
        }
        if self.median_kernel > MAX_MEDIAN_KERNEL {
            return Err(VisionError::InvalidConfig {
                reason: format!(
                    "median kernel must be at most {}, got {}",
                    MAX_MEDIAN_KERNEL, self.median_kernel
                ),
            });
        }
        if !self.canny_low.is_finite() || !self.canny_high.is_finite() || self.canny_low < 0.0 {
            return Err(VisionError::InvalidConfig {
                reason: format!(
                    "edge thresholds must be finite and >= 0, got {}/{}",
                    self.canny_low, self.canny_high
                ),
            });
        }
        if self.canny_low > self.canny_high {
            return Err(VisionError::InvalidConfig {
                reason: format!(
                    "edge low threshold {} exceeds high threshold {}",
                    self.canny_low, self.canny_high
                ),
            });
        }
        Ok(())
    }
}

/// The four pipeline stages for one comparison
#[derive(Debug, Clone)]
pub struct DefectStages {
    pub difference: GrayImage,
    pub blurred: GrayImage,
    pub threshold: GrayImage,
    pub edges: GrayImage,
    /// Level chosen by Otsu on the blurred difference
    pub otsu_level: u8,
}

impl DefectStages {
    /// Pixels flagged as significant deviation
    pub fn deviation_pixels(&self) -> usize {
        count_foreground(&self.threshold)
    }

    pub fn images(&self) -> [&GrayImage; 4] {
        [&self.difference, &self.blurred, &self.threshold, &self.edges]
    }

    /// Write every stage into `dir` under [`STAGE_FILE_NAMES`]
    pub fn save_all(&self, dir: &Path) -> Result<Vec<PathBuf>, VisionError> {
        let mut written = Vec::with_capacity(STAGE_FILE_NAMES.len());
        for (image, name) in self.images().into_iter().zip(STAGE_FILE_NAMES) {
            let path = dir.join(name);
            save_gray(image, &path)?;
            written.push(path);
        }
        debug!("Saved {} defect stages to {}", written.len(), dir.display());
        Ok(written)
    }
}

/// Runs the defect pipeline with a fixed configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct DefectHighlighter {
    config: DetectorConfig,
}

impl DefectHighlighter {
    pub fn new(config: DetectorConfig) -> Result<Self, VisionError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Compare `live` against `reference`.
    ///
    /// `live` is area-resampled to the reference size when they differ. A
    /// `mask` must match the reference size; `None` includes every pixel.
    pub fn highlight(
        &self,
        reference: &GrayImage,
        live: &GrayImage,
        mask: Option<&GrayImage>,
    ) -> Result<DefectStages, VisionError> {
        let (width, height) = reference.dimensions();
        if let Some(mask) = mask {
            if mask.dimensions() != (width, height) {
                return Err(VisionError::MaskSizeMismatch {
                    expected_width: width,
                    expected_height: height,
                    actual_width: mask.width(),
                    actual_height: mask.height(),
                });
            }
        }

        let resized;
        let live = if live.dimensions() == (width, height) {
            live
        } else {
            debug!(
                "Resampling live photo {}x{} to {}x{}",
                live.width(),
                live.height(),
                width,
                height
            );
            resized = resize_area(live, width, height);
            &resized
        };

        let mut difference = absdiff(reference, live)?;
        if let Some(mask) = mask {
            apply_mask(&mut difference, mask)?;
        }

        let blurred = median_filter(&difference, self.config.median_kernel);
        let otsu_level = otsu_level(&blurred);
        let threshold = threshold_above(&blurred, otsu_level);
        let edges = canny(&threshold, self.config.canny_low, self.config.canny_high);

        let stages = DefectStages {
            difference,
            blurred,
            threshold,
            edges,
            otsu_level,
        };
        debug!(
            "Defect pipeline: otsu level {}, {} deviation pixels, {} edge pixels",
            otsu_level,
            stages.deviation_pixels(),
            count_foreground(&stages.edges)
        );
        Ok(stages)
    }

    /// Load both photos (and an optional mask image) from disk and compare
    pub fn highlight_files(
        &self,
        reference: &Path,
        live: &Path,
        mask: Option<&GrayImage>,
    ) -> Result<DefectStages, VisionError> {
        let reference_image = load_gray(reference)?;
        let live_image = load_gray(live)?;
        info!(
            "Comparing {} against reference {}",
            live.display(),
            reference.display()
        );
        self.highlight(&reference_image, &live_image, mask)
    }
}
