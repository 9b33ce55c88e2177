//! Print monitor
//!
//! One tick takes the live height, picks the milestone reference for it,
//! runs the defect pipeline against the current camera frame and writes the
//! four stage images into a fresh per-tick directory.

use anyhow::Context;
use image::GrayImage;
use layerwatch_communication::HeightSource;
use layerwatch_core::Result;
use layerwatch_settings::Config;
use layerwatch_vision::roi::binarize_mask;
use layerwatch_vision::{
    load_gray, polygon_mask, DefectHighlighter, DefectStages, MilestoneTable, PixelVertex,
    SelectionStrategy,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the comparison mask comes from
#[derive(Debug, Clone, Default)]
pub enum MaskSource {
    /// Compare every pixel
    #[default]
    FullFrame,
    /// Polygon in reference pixel coordinates, rasterized per reference size
    Polygon(Vec<PixelVertex>),
    /// Pre-drawn binary mask
    Image(GrayImage),
}

impl MaskSource {
    /// Mask for a reference of the given size, `None` for the full frame
    pub fn for_size(&self, width: u32, height: u32) -> Option<GrayImage> {
        match self {
            Self::FullFrame => None,
            Self::Polygon(vertices) if vertices.is_empty() => None,
            Self::Polygon(vertices) => Some(polygon_mask(width, height, vertices)),
            Self::Image(mask) => Some(mask.clone()),
        }
    }
}

/// Outcome of a tick that found a milestone and compared against it
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub height: Option<f64>,
    pub layer: Option<u32>,
    /// Target height of the milestone used
    pub milestone_height: f64,
    pub reference: PathBuf,
    /// Directory holding this tick's stage images
    pub output_dir: PathBuf,
    pub stage_files: Vec<PathBuf>,
    pub otsu_level: u8,
    pub deviation_pixels: usize,
}

#[derive(Debug, Clone)]
pub struct Monitor {
    table: MilestoneTable,
    strategy: SelectionStrategy,
    highlighter: DefectHighlighter,
    mask: MaskSource,
    output_dir: PathBuf,
}

impl Monitor {
    pub fn new(
        table: MilestoneTable,
        highlighter: DefectHighlighter,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            table,
            strategy: SelectionStrategy::default(),
            highlighter,
            mask: MaskSource::default(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_mask(mut self, mask: MaskSource) -> Self {
        self.mask = mask;
        self
    }

    /// Build a monitor from a validated configuration.
    ///
    /// A configured mask image is loaded and binarized here, so a bad path
    /// fails at startup rather than on every tick.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let highlighter = DefectHighlighter::new(config.detection.detector())
            .context("invalid detection settings")?;

        let mask = match &config.detection.mask_image {
            Some(path) => {
                let image = load_gray(path)
                    .with_context(|| format!("loading mask image {}", path.display()))?;
                MaskSource::Image(binarize_mask(&image))
            }
            None => MaskSource::Polygon(config.detection.roi.clone()),
        };

        Ok(Self::new(config.milestone_table(), highlighter, &config.output.dir)
            .with_strategy(config.milestones.strategy)
            .with_mask(mask))
    }

    pub fn table(&self) -> &MilestoneTable {
        &self.table
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run one tick.
    ///
    /// Layer matching only happens when the caller supplies `layer`;
    /// otherwise the tick matches on height alone. Returns `None` when no
    /// milestone applies or any image step fails; failures are logged and
    /// never abort the caller's loop.
    pub fn step(
        &self,
        height: Option<f64>,
        layer: Option<u32>,
        live_photo: &Path,
    ) -> Option<TickReport> {
        let milestone = self.table.match_progress(height, layer, self.strategy)?;
        let reference = self.table.select(height, layer, self.strategy)?;

        let tick_dir = self.tick_dir(height.unwrap_or(milestone.target_height));
        let (stages, stage_files) = match self.compare(reference, live_photo, &tick_dir) {
            Ok(compared) => compared,
            Err(e) => {
                warn!("Skipping tick: {}", e);
                return None;
            }
        };

        let report = TickReport {
            height,
            layer,
            milestone_height: milestone.target_height,
            reference: reference.to_path_buf(),
            output_dir: tick_dir,
            stage_files,
            otsu_level: stages.otsu_level,
            deviation_pixels: stages.deviation_pixels(),
        };
        info!(
            "Milestone {:.2} mm: {} deviation pixels (otsu {}) -> {}",
            report.milestone_height,
            report.deviation_pixels,
            report.otsu_level,
            report.output_dir.display()
        );
        Some(report)
    }

    /// Compare `live_photo` against `reference` and write the stages to `tick_dir`
    fn compare(
        &self,
        reference: &Path,
        live_photo: &Path,
        tick_dir: &Path,
    ) -> Result<(DefectStages, Vec<PathBuf>)> {
        let reference_image = load_gray(reference)?;
        let live_image = load_gray(live_photo)?;

        let (width, height) = reference_image.dimensions();
        let mask = self.mask.for_size(width, height);
        let stages = self
            .highlighter
            .highlight(&reference_image, &live_image, mask.as_ref())?;
        let stage_files = stages.save_all(tick_dir)?;
        Ok((stages, stage_files))
    }

    fn tick_dir(&self, height: f64) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S%.3f");
        self.output_dir.join(format!("{}-z{:.2}", stamp, height))
    }

    /// Poll `source` every `period` and run a tick against `live_photo`.
    ///
    /// Runs forever when `max_ticks` is `None`. Each comparison is handed to
    /// `on_report` and not kept; returns how many comparisons ran.
    pub async fn watch<F>(
        &self,
        source: &dyn HeightSource,
        live_photo: &Path,
        period: Duration,
        max_ticks: Option<u64>,
        mut on_report: F,
    ) -> u64
    where
        F: FnMut(TickReport),
    {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut compared = 0u64;
        let mut ticks = 0u64;
        while max_ticks.is_none_or(|max| ticks < max) {
            interval.tick().await;
            ticks += 1;

            let Some(height) = source.current_height().await else {
                debug!("Tick {}: no height, skipping", ticks);
                continue;
            };
            if let Some(report) = self.step(Some(height), None, live_photo) {
                compared += 1;
                on_report(report);
            }
        }
        compared
    }
}
