//! Region-of-interest masks
//!
//! The ROI is digitized by hand as an ordered list of pixel vertices on a
//! reference frame. It is filled into a 0/255 mask the size of the
//! reference image.

use image::{GrayImage, Luma};

/// `(x, y)` pixel vertex
pub type PixelVertex = (i32, i32);

/// Fill `vertices` into a `width` x `height` mask.
///
/// Even-odd rule, sampled at pixel centers. An empty polygon includes the
/// whole frame; fewer than three vertices include nothing.
pub fn polygon_mask(width: u32, height: u32, vertices: &[PixelVertex]) -> GrayImage {
    if vertices.is_empty() {
        return GrayImage::from_pixel(width, height, Luma([255]));
    }
    let mut mask = GrayImage::new(width, height);
    if vertices.len() < 3 {
        return mask;
    }

    let points: Vec<(f64, f64)> = vertices
        .iter()
        .map(|&(x, y)| (f64::from(x), f64::from(y)))
        .collect();
    let mut crossings = Vec::with_capacity(points.len());

    for row in 0..height {
        let yc = f64::from(row) + 0.5;
        crossings.clear();
        for (i, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(i + 1) % points.len()];
            if (y0 > yc) != (y1 > yc) {
                crossings.push(x0 + (yc - y0) * (x1 - x0) / (y1 - y0));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            // pixel x is inside when x + 0.5 lies in [span[0], span[1])
            let start = (span[0] - 0.5).ceil().max(0.0);
            let end = (span[1] - 0.5).ceil().min(f64::from(width));
            let mut x = start;
            while x < end {
                mask.put_pixel(x as u32, row, Luma([255]));
                x += 1.0;
            }
        }
    }
    mask
}

/// Normalize a pre-drawn mask image: any non-zero pixel becomes 255
pub fn binarize_mask(image: &GrayImage) -> GrayImage {
    let mut mask = image.clone();
    for pixel in mask.pixels_mut() {
        if pixel.0[0] != 0 {
            pixel.0[0] = 255;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] == 255).count()
    }

    #[test]
    fn test_empty_polygon_is_full_frame() {
        let mask = polygon_mask(8, 6, &[]);
        assert_eq!(inside(&mask), 48);
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        assert_eq!(inside(&polygon_mask(8, 6, &[(0, 0), (5, 5)])), 0);
    }

    #[test]
    fn test_rectangle() {
        let mask = polygon_mask(10, 10, &[(2, 2), (8, 2), (8, 6), (2, 6)]);
        assert_eq!(inside(&mask), 6 * 4);
        assert_eq!(mask.get_pixel(2, 2).0[0], 255);
        assert_eq!(mask.get_pixel(7, 5).0[0], 255);
        assert_eq!(mask.get_pixel(8, 5).0[0], 0);
        assert_eq!(mask.get_pixel(2, 6).0[0], 0);
    }

    #[test]
    fn test_polygon_clipped_to_frame() {
        let mask = polygon_mask(4, 4, &[(-10, -10), (10, -10), (10, 10), (-10, 10)]);
        assert_eq!(inside(&mask), 16);
    }

    #[test]
    fn test_self_intersecting_uses_even_odd() {
        // bow tie: two triangles meeting at the center
        let mask = polygon_mask(20, 20, &[(0, 0), (20, 20), (20, 0), (0, 20)]);
        assert_eq!(mask.get_pixel(10, 2).0[0], 0);
        assert_eq!(mask.get_pixel(2, 10).0[0], 255);
        assert_eq!(mask.get_pixel(18, 10).0[0], 255);
    }

    #[test]
    fn test_binarize_mask() {
        let image = GrayImage::from_raw(3, 1, vec![0, 1, 200]).unwrap();
        assert_eq!(binarize_mask(&image).as_raw(), &vec![0, 255, 255]);
    }
}
