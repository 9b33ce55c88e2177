//! Single-channel image loading and saving

use image::GrayImage;
use layerwatch_core::VisionError;
use std::path::Path;

/// Decode any supported image and convert it to 8-bit grayscale
pub fn load_gray(path: &Path) -> Result<GrayImage, VisionError> {
    let image = image::open(path).map_err(|e| VisionError::ImageRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(image.to_luma8())
}

/// Write `image`, creating parent directories as needed
pub fn save_gray(image: &GrayImage, path: &Path) -> Result<(), VisionError> {
    let write_error = |reason: String| VisionError::ImageWrite {
        path: path.display().to_string(),
        reason,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
    }
    image.save(path).map_err(|e| write_error(e.to_string()))
}
