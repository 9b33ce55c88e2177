//! Silhouette rasterization
//!
//! Draws windowed XZ segments into a single-channel canvas. Model Z grows
//! upward while pixel rows grow downward, so rows are flipped against
//! `z_max`. Every pixel write is bounds-checked.

use image::{GrayImage, Luma};
use layerwatch_core::GcodeError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::extract::{extract_segments, LayerWindow, WindowedSegments};
use super::options::{to_pixel_extent, RenderOptions, StrokePolicy};
use crate::gcode::ParsedToolpath;

const FOREGROUND: Luma<u8> = Luma([255]);

/// Facts about a rendered silhouette, for logging and verification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderInfo {
    pub segments_drawn: usize,
    pub z_top: Option<f64>,
    pub layer_h: f64,
    pub target_layer: Option<u32>,
    pub z_max: f64,
    pub width: u32,
    pub height: u32,
    pub stroke: StrokePolicy,
}

/// A rendered canvas and how it was produced
#[derive(Debug, Clone)]
pub struct Silhouette {
    pub image: GrayImage,
    pub info: RenderInfo,
}

impl Silhouette {
    /// Write the canvas; the format follows the file extension
    pub fn save(&self, path: &Path) -> Result<(), GcodeError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| GcodeError::WriteFailed {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        self.image.save(path).map_err(|e| GcodeError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!(
            "Wrote silhouette {} ({}x{}, {} segments, z_max {:.3} mm)",
            path.display(),
            self.info.width,
            self.info.height,
            self.info.segments_drawn,
            self.info.z_max
        );
        Ok(())
    }
}

/// Millimeter to pixel mapping for one canvas; halves round to even
#[derive(Debug, Clone, Copy)]
struct PixelMap {
    scale: f64,
    bed_width: f64,
    z_max: f64,
}

impl PixelMap {
    fn column(&self, x: f64) -> i64 {
        (x.clamp(0.0, self.bed_width) * self.scale).round_ties_even() as i64
    }

    fn row(&self, z: f64) -> i64 {
        ((self.z_max - z.clamp(0.0, self.z_max)) * self.scale).round_ties_even() as i64
    }
}

/// Draw windowed segments onto a fresh black canvas.
///
/// Width is `round(bed_width * scale)` and height `round(z_max * scale)`,
/// both at least 1. Stroke thickness is `max(1, round(layer_height * scale))`.
pub fn rasterize(windowed: &WindowedSegments, options: &RenderOptions) -> GrayImage {
    let width = options.canvas_width();
    let height = to_pixel_extent(windowed.z_max * options.scale_px_per_mm);
    let thickness = to_pixel_extent(windowed.layer_height * options.scale_px_per_mm) as i64;

    let map = PixelMap {
        scale: options.scale_px_per_mm,
        bed_width: options.bed_width_mm,
        z_max: windowed.z_max,
    };

    let mut canvas = GrayImage::new(width, height);
    for segment in &windowed.segments {
        let (x0, y0) = (map.column(segment.start.x), map.row(segment.start.z));
        let (x1, y1) = (map.column(segment.end.x), map.row(segment.end.z));
        match options.stroke {
            StrokePolicy::FilledBead => fill_bead(&mut canvas, (x0, y0), (x1, y1), thickness),
            StrokePolicy::Line => stroke_line(&mut canvas, (x0, y0), (x1, y1), thickness),
        }
    }

    debug!(
        "Rasterized {} segments onto {}x{} canvas ({}, {} px stroke)",
        windowed.segments.len(),
        width,
        height,
        options.stroke,
        thickness
    );
    canvas
}

fn put(canvas: &mut GrayImage, x: i64, y: i64) {
    if x >= 0 && y >= 0 && x < i64::from(canvas.width()) && y < i64::from(canvas.height()) {
        canvas.put_pixel(x as u32, y as u32, FOREGROUND);
    }
}

/// Inclusive rectangle spanning the X range, `thickness` rows below the
/// higher endpoint, clamped to the canvas
fn fill_bead(canvas: &mut GrayImage, p0: (i64, i64), p1: (i64, i64), thickness: i64) {
    let max_x = i64::from(canvas.width()) - 1;
    let max_y = i64::from(canvas.height()) - 1;

    let top = p0.1.min(p1.1);
    let bottom = (top + thickness).clamp(0, max_y);
    let top = top.clamp(0, max_y);
    let left = p0.0.min(p1.0).clamp(0, max_x);
    let right = p0.0.max(p1.0).clamp(0, max_x);

    for y in top..=bottom {
        for x in left..=right {
            put(canvas, x, y);
        }
    }
}

/// Bresenham line stamped with a `thickness`-sided square
fn stroke_line(canvas: &mut GrayImage, p0: (i64, i64), p1: (i64, i64), thickness: i64) {
    let lead = (thickness - 1) / 2;
    let mut stamp = |cx: i64, cy: i64| {
        for y in (cy - lead)..(cy - lead + thickness) {
            for x in (cx - lead)..(cx - lead + thickness) {
                put(canvas, x, y);
            }
        }
    };

    let (mut x, mut y) = p0;
    let dx = (p1.0 - x).abs();
    let dy = -(p1.1 - y).abs();
    let sx = if x < p1.0 { 1 } else { -1 };
    let sy = if y < p1.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        stamp(x, y);
        if x == p1.0 && y == p1.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Window a parsed toolpath and rasterize it
pub fn render_silhouette(
    toolpath: &ParsedToolpath,
    window: LayerWindow,
    options: &RenderOptions,
) -> Result<Silhouette, GcodeError> {
    options.validate()?;

    let layer_h = toolpath.layer_height.value;
    let windowed = extract_segments(&toolpath.moves, layer_h, window, options);
    let image = rasterize(&windowed, options);

    let info = RenderInfo {
        segments_drawn: windowed.segments.len(),
        z_top: windowed.z_top,
        layer_h,
        target_layer: window.target_layer(),
        z_max: windowed.z_max,
        width: image.width(),
        height: image.height(),
        stroke: options.stroke,
    };
    Ok(Silhouette { image, info })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::silhouette::Segment;
    use layerwatch_core::XzPoint;

    fn windowed(segments: Vec<Segment>, z_max: f64, layer_height: f64) -> WindowedSegments {
        WindowedSegments {
            segments,
            window: LayerWindow::Unbounded,
            z_top: None,
            z_max,
            layer_height,
        }
    }

    fn lit(image: &GrayImage) -> usize {
        image.pixels().filter(|p| p.0[0] == 255).count()
    }

    #[test]
    fn test_pixel_map_rounds_halves_to_even() {
        let map = PixelMap {
            scale: 2.0,
            bed_width: 10.0,
            z_max: 2.0,
        };
        assert_eq!(map.column(0.25), 0);
        assert_eq!(map.column(0.75), 2);
        assert_eq!(map.column(1.25), 2);
        assert_eq!(map.row(1.75), 0);
        assert_eq!(map.row(1.25), 2);
    }

    #[test]
    fn test_canvas_size() {
        let options = RenderOptions::default().with_bed_width(10.0).with_scale(4.0);
        let image = rasterize(&windowed(Vec::new(), 2.0, 0.2), &options);
        assert_eq!(image.dimensions(), (40, 8));
        assert_eq!(lit(&image), 0);
    }

    #[test]
    fn test_filled_bead_rectangle() {
        let options = RenderOptions::default().with_bed_width(10.0).with_scale(4.0);
        let seg = Segment::new(XzPoint::new(1.0, 1.0), XzPoint::new(3.0, 1.0));
        let image = rasterize(&windowed(vec![seg], 2.0, 0.5), &options);
        // columns 4..=12, rows 4..=6 (thickness 2, inclusive)
        assert_eq!(lit(&image), 9 * 3);
        assert_eq!(image.get_pixel(4, 4).0[0], 255);
        assert_eq!(image.get_pixel(12, 6).0[0], 255);
        assert_eq!(image.get_pixel(13, 4).0[0], 0);
        assert_eq!(image.get_pixel(4, 7).0[0], 0);
    }

    #[test]
    fn test_filled_bead_clamps_at_canvas_edge() {
        let options = RenderOptions::default().with_bed_width(10.0).with_scale(4.0);
        let seg = Segment::new(XzPoint::new(0.0, 0.0), XzPoint::new(10.0, 0.0));
        let image = rasterize(&windowed(vec![seg], 1.0, 0.5), &options);
        // bottom row, full width; everything below the canvas is clipped
        assert_eq!(image.dimensions(), (40, 4));
        assert_eq!(lit(&image), 40);
    }

    #[test]
    fn test_line_stroke_thickness() {
        let options = RenderOptions::default()
            .with_bed_width(10.0)
            .with_scale(4.0)
            .with_stroke(StrokePolicy::Line);
        let seg = Segment::new(XzPoint::new(1.0, 1.0), XzPoint::new(3.0, 1.0));
        let image = rasterize(&windowed(vec![seg], 2.0, 0.25), &options);
        // thickness 1: exactly the 9 pixels of row 4
        assert_eq!(lit(&image), 9);
        assert!((4..=12).all(|x| image.get_pixel(x, 4).0[0] == 255));
    }

    #[test]
    fn test_line_diagonal_reaches_both_ends() {
        let options = RenderOptions::default()
            .with_bed_width(5.0)
            .with_scale(2.0)
            .with_stroke(StrokePolicy::Line);
        let seg = Segment::new(XzPoint::new(0.0, 0.0), XzPoint::new(4.0, 4.0));
        let image = rasterize(&windowed(vec![seg], 4.0, 0.5), &options);
        assert_eq!(image.dimensions(), (10, 8));
        // z = 0 maps to row 8, one past the last row
        assert_eq!(image.get_pixel(1, 7).0[0], 255);
        assert_eq!(image.get_pixel(8, 0).0[0], 255);
        assert_eq!(lit(&image), 8);
    }

    #[test]
    fn test_line_stamp_at_border_is_clipped() {
        let options = RenderOptions::default()
            .with_bed_width(5.0)
            .with_scale(2.0)
            .with_stroke(StrokePolicy::Line);
        let seg = Segment::new(XzPoint::new(5.0, 0.0), XzPoint::new(5.0, 3.0));
        let image = rasterize(&windowed(vec![seg], 3.0, 2.0), &options);
        assert_eq!(image.dimensions(), (10, 6));
        assert!(lit(&image) > 0);
    }
}
