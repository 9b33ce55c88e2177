//! Area-based resampling
//!
//! Each destination pixel is the average of the source area it covers,
//! weighted by overlap. Separable: rows first, then columns.

use image::GrayImage;

/// Source taps and weights for every destination index along one axis
fn axis_taps(src: u32, dst: u32) -> Vec<Vec<(usize, f64)>> {
    let scale = f64::from(src) / f64::from(dst);
    (0..dst)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = (f64::from(d) + 1.0) * scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src);
            (first..last)
                .filter_map(|s| {
                    let overlap = end.min(f64::from(s) + 1.0) - start.max(f64::from(s));
                    (overlap > 0.0).then_some((s as usize, overlap / scale))
                })
                .collect()
        })
        .collect()
}

/// Resize to `width` x `height` by area averaging.
///
/// Returns a copy when the size already matches. Zero target sizes are
/// raised to 1.
pub fn resize_area(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    let (width, height) = (width.max(1), height.max(1));
    let (src_w, src_h) = image.dimensions();
    if (src_w, src_h) == (width, height) {
        return image.clone();
    }
    if src_w == 0 || src_h == 0 {
        return GrayImage::new(width, height);
    }

    let x_taps = axis_taps(src_w, width);
    let y_taps = axis_taps(src_h, height);
    let src = image.as_raw();
    let src_stride = src_w as usize;

    // horizontal pass: src_h rows of `width` samples
    let mut rows = vec![0.0f64; src_h as usize * width as usize];
    for y in 0..src_h as usize {
        let line = &src[y * src_stride..(y + 1) * src_stride];
        for (x, taps) in x_taps.iter().enumerate() {
            rows[y * width as usize + x] = taps
                .iter()
                .map(|&(s, w)| f64::from(line[s]) * w)
                .sum();
        }
    }

    let mut out = GrayImage::new(width, height);
    for (y, taps) in y_taps.iter().enumerate() {
        for x in 0..width as usize {
            let value: f64 = taps
                .iter()
                .map(|&(s, w)| rows[s * width as usize + x] * w)
                .sum();
            let value = value.round_ties_even().clamp(0.0, 255.0) as u8;
            out.put_pixel(x as u32, y as u32, image::Luma([value]));
        }
    }
    out
}
