//! Single-channel image filters used by the defect pipeline
//!
//! All filters take and return `GrayImage` and are deterministic: the same
//! input always yields byte-identical output.

pub mod canny;
pub mod median;
pub mod otsu;
pub mod pixelwise;
pub mod resample;

pub use canny::canny;
pub use median::median_filter;
pub use otsu::{otsu_level, threshold_above};
pub use pixelwise::{absdiff, apply_mask, count_foreground};
pub use resample::resize_area;

/// Clamp a signed coordinate into `[0, len)`, replicating the border
#[inline]
pub(crate) fn replicate(i: i64, len: u32) -> u32 {
    i.clamp(0, i64::from(len) - 1) as u32
}
