//! Per-pixel operations on equally sized images

use image::GrayImage;
use layerwatch_core::VisionError;

fn check_size(expected: &GrayImage, actual: &GrayImage) -> Result<(), VisionError> {
    if expected.dimensions() == actual.dimensions() {
        return Ok(());
    }
    Err(VisionError::MaskSizeMismatch {
        expected_width: expected.width(),
        expected_height: expected.height(),
        actual_width: actual.width(),
        actual_height: actual.height(),
    })
}

/// `|a - b|` per pixel; both images must have the same size
pub fn absdiff(a: &GrayImage, b: &GrayImage) -> Result<GrayImage, VisionError> {
    check_size(a, b)?;
    let data = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&p, &q)| p.abs_diff(q))
        .collect();
    GrayImage::from_raw(a.width(), a.height(), data).ok_or_else(|| VisionError::InvalidConfig {
        reason: "difference buffer size mismatch".to_string(),
    })
}

/// Zero every pixel where the mask is 0
pub fn apply_mask(image: &mut GrayImage, mask: &GrayImage) -> Result<(), VisionError> {
    check_size(image, mask)?;
    for (pixel, m) in image.pixels_mut().zip(mask.pixels()) {
        if m.0[0] == 0 {
            pixel.0[0] = 0;
        }
    }
    Ok(())
}

/// Number of non-zero pixels
pub fn count_foreground(image: &GrayImage) -> usize {
    image.as_raw().iter().filter(|&&p| p != 0).count()
}
