//! Milestone selection
//!
//! A milestone pairs a print height with a reference photo captured at that
//! height. Each monitor tick picks the reference for the current height, or
//! nothing when the print is between milestones.
//!
//! Tie-break: the table is scanned in order and the first milestone within
//! tolerance wins, even when a later one is closer.

use layerwatch_core::constants::DEFAULT_MILESTONE_TOLERANCE_MM;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::height_layer::HeightLayerConverter;

/// Absorbs representation error so `target ± tolerance` itself matches
const TOLERANCE_SLACK_MM: f64 = 1e-9;

/// A reference photo and the height it was captured at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub target_height: f64,
    pub reference: PathBuf,
}

impl Milestone {
    pub fn new(target_height: f64, reference: impl Into<PathBuf>) -> Self {
        Self {
            target_height,
            reference: reference.into(),
        }
    }
}

/// How to match the current print progress against milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Match on continuous height
    #[default]
    Height,
    /// Match on layer index first, then fall back to height
    PreferLayer,
}

/// Ordered, immutable milestone table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneTable {
    milestones: Vec<Milestone>,
    tolerance: f64,
    converter: HeightLayerConverter,
}

impl MilestoneTable {
    pub fn new(milestones: Vec<Milestone>) -> Self {
        Self {
            milestones,
            tolerance: DEFAULT_MILESTONE_TOLERANCE_MM,
            converter: HeightLayerConverter::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_converter(mut self, converter: HeightLayerConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// First milestone whose target is within tolerance of `height`
    pub fn find_by_height(&self, height: f64) -> Option<&Milestone> {
        self.milestones
            .iter()
            .find(|m| (height - m.target_height).abs() <= self.tolerance + TOLERANCE_SLACK_MM)
    }

    /// First milestone whose target height converts to `layer`.
    ///
    /// Returns `None` when the converter has a non-positive layer height.
    pub fn find_by_layer(&self, layer: u32) -> Option<&Milestone> {
        self.milestones.iter().find(|m| {
            self.converter
                .layer_for_height(m.target_height)
                .is_ok_and(|l| l == layer)
        })
    }

    /// Milestone matching this tick, without touching the filesystem
    pub fn match_progress(
        &self,
        height: Option<f64>,
        layer: Option<u32>,
        strategy: SelectionStrategy,
    ) -> Option<&Milestone> {
        let by_layer = match (strategy, layer) {
            (SelectionStrategy::PreferLayer, Some(layer)) => self.find_by_layer(layer),
            _ => None,
        };
        by_layer.or_else(|| height.and_then(|h| self.find_by_height(h)))
    }

    /// Reference photo for this tick.
    ///
    /// A matched milestone whose file is missing is reported as no match so
    /// a polling loop can skip the tick.
    pub fn select(
        &self,
        height: Option<f64>,
        layer: Option<u32>,
        strategy: SelectionStrategy,
    ) -> Option<&Path> {
        let Some(milestone) = self.match_progress(height, layer, strategy) else {
            debug!("No milestone for height {:?}, layer {:?}", height, layer);
            return None;
        };

        if !milestone.reference.is_file() {
            warn!(
                "Skipping milestone {:.3} mm: missing reference {}",
                milestone.target_height,
                milestone.reference.display()
            );
            return None;
        }

        debug!(
            "Selected milestone {:.3} mm ({})",
            milestone.target_height,
            milestone.reference.display()
        );
        Some(milestone.reference.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MilestoneTable {
        MilestoneTable::new(vec![
            Milestone::new(-2.0, "imgs/bkgnd_00.jpg"),
            Milestone::new(0.0, "imgs/bkgnd_02.jpg"),
            Milestone::new(1.0, "imgs/bkgnd_03.jpg"),
            Milestone::new(1.04, "imgs/near_duplicate.jpg"),
            Milestone::new(10.0, "imgs/bkgnd_12.jpg"),
        ])
    }

    #[test]
    fn test_find_by_height() {
        let table = table();
        assert_eq!(
            table.find_by_height(10.02).map(|m| m.target_height),
            Some(10.0)
        );
        assert!(table.find_by_height(5.0).is_none());
    }

    #[test]
    fn test_first_match_wins_over_nearest() {
        let table = table();
        let m = table.find_by_height(1.03).unwrap();
        assert_eq!(m.reference, PathBuf::from("imgs/bkgnd_03.jpg"));
    }

    #[test]
    fn test_find_by_layer() {
        let table = table();
        // 1.0 mm is layer 4 with 0.2 first layer and 0.2 layer height
        assert_eq!(table.find_by_layer(4).map(|m| m.target_height), Some(1.0));
        // negative heights clamp to layer 0, and -2.0 comes first
        assert_eq!(table.find_by_layer(0).map(|m| m.target_height), Some(-2.0));
        assert!(table.find_by_layer(7).is_none());
    }

    #[test]
    fn test_strategy_defaults_to_height() {
        let table = table();
        let m = table.match_progress(Some(10.0), Some(4), SelectionStrategy::Height);
        assert_eq!(m.map(|m| m.target_height), Some(10.0));

        let m = table.match_progress(Some(10.0), Some(4), SelectionStrategy::PreferLayer);
        assert_eq!(m.map(|m| m.target_height), Some(1.0));
    }

    #[test]
    fn test_prefer_layer_falls_back_to_height() {
        let table = table();
        let m = table.match_progress(Some(10.0), Some(7), SelectionStrategy::PreferLayer);
        assert_eq!(m.map(|m| m.target_height), Some(10.0));
        let m = table.match_progress(Some(10.0), None, SelectionStrategy::PreferLayer);
        assert_eq!(m.map(|m| m.target_height), Some(10.0));
        assert!(table
            .match_progress(None, None, SelectionStrategy::PreferLayer)
            .is_none());
    }

    #[test]
    fn test_missing_reference_is_no_match() {
        let table = table();
        assert!(table
            .select(Some(10.0), None, SelectionStrategy::Height)
            .is_none());
    }
}
