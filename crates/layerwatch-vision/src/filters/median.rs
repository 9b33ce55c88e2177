//! Median filter with replicated borders
//!
//! Sliding-histogram implementation: each row starts from a full window
//! histogram, then moves one column at a time by removing the leaving
//! column and adding the entering one. Cost per pixel is `O(kernel)`.

use image::GrayImage;

use super::replicate;

fn rank_in_histogram(histogram: &[u64; 256], rank: u64) -> u8 {
    let mut seen = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen > rank {
            return value as u8;
        }
    }
    255
}

/// Median of each `kernel` x `kernel` neighborhood.
///
/// `kernel` must be odd; an even value is rounded up to the next odd size.
pub fn median_filter(image: &GrayImage, kernel: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let kernel = kernel.max(1) | 1;
    if kernel == 1 {
        return image.clone();
    }
    let radius = i64::from(kernel / 2);
    let rank = u64::from(kernel) * u64::from(kernel) / 2;
    let at = |x: i64, y: i64| image.get_pixel(replicate(x, width), replicate(y, height)).0[0];

    for y in 0..i64::from(height) {
        let mut histogram = [0u64; 256];
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                histogram[at(dx, y + dy) as usize] += 1;
            }
        }
        out.put_pixel(0, y as u32, image::Luma([rank_in_histogram(&histogram, rank)]));

        for x in 1..i64::from(width) {
            for dy in -radius..=radius {
                histogram[at(x - radius - 1, y + dy) as usize] -= 1;
                histogram[at(x + radius, y + dy) as usize] += 1;
            }
            out.put_pixel(
                x as u32,
                y as u32,
                image::Luma([rank_in_histogram(&histogram, rank)]),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_removes_salt_and_pepper() {
        let mut image = GrayImage::from_pixel(9, 9, Luma([40]));
        image.put_pixel(4, 4, Luma([255]));
        image.put_pixel(1, 7, Luma([0]));
        let out = median_filter(&image, 3);
        assert!(out.pixels().all(|p| p.0[0] == 40));
    }

    #[test]
    fn test_preserves_large_regions() {
        let mut image = GrayImage::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                image.put_pixel(x, y, Luma([255]));
            }
        }
        let out = median_filter(&image, 5);
        assert_eq!(out.get_pixel(10, 10).0[0], 255);
        assert_eq!(out.get_pixel(1, 1).0[0], 0);
        // straight edges survive a square median
        assert_eq!(out.get_pixel(5, 10).0[0], 255);
        assert_eq!(out.get_pixel(4, 10).0[0], 0);
    }

    #[test]
    fn test_replicated_border_keeps_edge_values() {
        let image = GrayImage::from_raw(3, 1, vec![10, 20, 30]).unwrap();
        let out = median_filter(&image, 3);
        assert_eq!(out.as_raw(), &vec![10, 20, 30]);
    }

    #[test]
    fn test_kernel_larger_than_image() {
        let image = GrayImage::from_raw(2, 2, vec![0, 0, 0, 255]).unwrap();
        let out = median_filter(&image, 15);
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }
}
