//! # LayerWatch Vision
//!
//! Picks the reference photo for the current print height and highlights
//! where a live photo deviates from it.
//!
//! The defect pipeline runs in four inspectable stages: masked absolute
//! difference, median denoise, Otsu binarization and Canny edges.

pub mod defect;
pub mod filters;
pub mod height_layer;
pub mod io;
pub mod milestone;
pub mod roi;

pub use defect::{DefectHighlighter, DefectStages, DetectorConfig, STAGE_FILE_NAMES};
pub use height_layer::HeightLayerConverter;
pub use io::{load_gray, save_gray};
pub use milestone::{Milestone, MilestoneTable, SelectionStrategy};
pub use roi::{polygon_mask, PixelVertex};
