//! Layer windowing of extrusion moves into XZ segments

use layerwatch_core::XzPoint;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::options::RenderOptions;
use crate::gcode::ExtrusionMove;

/// One extruded line in the XZ plane, already clamped to the bed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: XzPoint,
    pub end: XzPoint,
}

impl Segment {
    pub fn new(start: XzPoint, end: XzPoint) -> Self {
        Self { start, end }
    }

    pub fn max_z(&self) -> f64 {
        self.start.z.max(self.end.z)
    }

    pub fn min_z(&self) -> f64 {
        self.start.z.min(self.end.z)
    }
}

/// Which part of the print to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerWindow {
    /// Everything up to and including this zero-based layer
    UpTo(u32),
    /// The whole file
    Unbounded,
}

impl LayerWindow {
    pub fn target_layer(&self) -> Option<u32> {
        match self {
            Self::UpTo(layer) => Some(*layer),
            Self::Unbounded => None,
        }
    }

    /// `(target_layer + 1) * layer_height`, or `None` when unbounded
    pub fn z_top(&self, layer_height: f64) -> Option<f64> {
        self.target_layer()
            .map(|layer| (f64::from(layer) + 1.0) * layer_height)
    }
}

impl From<Option<u32>> for LayerWindow {
    fn from(layer: Option<u32>) -> Self {
        layer.map_or(Self::Unbounded, Self::UpTo)
    }
}

/// Segments that survived windowing, with the canvas height they need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowedSegments {
    pub segments: Vec<Segment>,
    pub window: LayerWindow,
    pub z_top: Option<f64>,
    /// Effective top of the canvas in millimeters, always > 0
    pub z_max: f64,
    pub layer_height: f64,
}

fn outside_bed(x: f64, bed_width: f64) -> bool {
    !(0.0..=bed_width).contains(&x)
}

/// Clamp moves to the bed and keep those inside the layer window.
///
/// X is clamped to `[0, bed_width]` and Z to `>= 0`. A move whose two X
/// endpoints both lie off the bed is dropped. With a bounded window a
/// segment is kept when `max(z0, z1) <= z_top + epsilon`, and `z_max` is
/// at least `z_top`; it never falls below the layer height.
pub fn extract_segments(
    moves: &[ExtrusionMove],
    layer_height: f64,
    window: LayerWindow,
    options: &RenderOptions,
) -> WindowedSegments {
    let bed_width = options.bed_width_mm;
    let z_top = window.z_top(layer_height);
    let limit = z_top.map(|top| top + options.window_epsilon);

    let mut segments = Vec::new();
    let mut dropped_off_bed = 0usize;
    let mut z_reached = z_top.unwrap_or(0.0);

    for mv in moves {
        let (from, to) = mv.xz();
        if outside_bed(from.x, bed_width) && outside_bed(to.x, bed_width) {
            dropped_off_bed += 1;
            continue;
        }

        let segment = Segment::new(
            XzPoint::new(from.x.clamp(0.0, bed_width), from.z.max(0.0)),
            XzPoint::new(to.x.clamp(0.0, bed_width), to.z.max(0.0)),
        );
        if limit.is_some_and(|limit| segment.max_z() > limit) {
            continue;
        }

        z_reached = z_reached.max(segment.max_z());
        segments.push(segment);
    }

    let z_max = if z_reached > layer_height {
        z_reached
    } else {
        layer_height
    };

    debug!(
        "Windowed {} of {} moves (off bed: {}), z_top={:?}, z_max={:.3}",
        segments.len(),
        moves.len(),
        dropped_off_bed,
        z_top,
        z_max
    );

    WindowedSegments {
        segments,
        window,
        z_top,
        z_max,
        layer_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerwatch_core::Position;

    fn mv(x0: f64, z0: f64, x1: f64, z1: f64) -> ExtrusionMove {
        ExtrusionMove {
            from: Position::new(x0, 0.0, z0, 0.0),
            to: Position::new(x1, 0.0, z1, 1.0),
        }
    }

    #[test]
    fn test_z_top() {
        assert!((LayerWindow::UpTo(0).z_top(0.2).unwrap_or(0.0) - 0.2).abs() < 1e-12);
        assert!((LayerWindow::UpTo(4).z_top(0.2).unwrap_or(0.0) - 1.0).abs() < 1e-12);
        assert_eq!(LayerWindow::Unbounded.z_top(0.2), None);
    }

    #[test]
    fn test_window_filters_by_max_z() {
        let options = RenderOptions::default();
        let moves = [
            mv(0.0, 0.2, 10.0, 0.2),
            mv(10.0, 0.2, 10.0, 0.4),
            mv(10.0, 0.4, 0.0, 0.4),
        ];
        let windowed = extract_segments(&moves, 0.2, LayerWindow::UpTo(0), &options);
        assert_eq!(windowed.segments.len(), 1);
        assert!((windowed.z_max - 0.2).abs() < 1e-12);

        let windowed = extract_segments(&moves, 0.2, LayerWindow::UpTo(1), &options);
        assert_eq!(windowed.segments.len(), 3);
    }

    #[test]
    fn test_epsilon_admits_rounding_noise() {
        let moves = [mv(0.0, 0.0, 5.0, 0.6000000001)];
        let options = RenderOptions::default();
        let windowed = extract_segments(&moves, 0.2, LayerWindow::UpTo(2), &options);
        assert_eq!(windowed.segments.len(), 1);
    }

    #[test]
    fn test_clamps_to_bed() {
        let options = RenderOptions::default().with_bed_width(100.0);
        let moves = [mv(-5.0, -1.0, 120.0, 0.2)];
        let windowed = extract_segments(&moves, 0.2, LayerWindow::UpTo(3), &options);
        assert_eq!(windowed.segments.len(), 0);

        let moves = [mv(-5.0, -1.0, 50.0, 0.2), mv(50.0, 0.2, 120.0, 0.2)];
        let windowed = extract_segments(&moves, 0.2, LayerWindow::UpTo(3), &options);
        assert_eq!(windowed.segments[0].start, XzPoint::new(0.0, 0.0));
        assert_eq!(windowed.segments[1].end, XzPoint::new(100.0, 0.2));
    }

    #[test]
    fn test_empty_window_keeps_positive_height() {
        let options = RenderOptions::default();
        let windowed = extract_segments(&[], 0.2, LayerWindow::UpTo(0), &options);
        assert!(windowed.segments.is_empty());
        assert!((windowed.z_max - 0.2).abs() < 1e-12);

        let windowed = extract_segments(&[], 0.3, LayerWindow::Unbounded, &options);
        assert_eq!(windowed.z_max, 0.3);
    }

    #[test]
    fn test_unbounded_uses_highest_segment() {
        let moves = [mv(0.0, 0.2, 10.0, 0.2), mv(0.0, 7.5, 10.0, 7.5)];
        let options = RenderOptions::default();
        let windowed = extract_segments(&moves, 0.2, LayerWindow::Unbounded, &options);
        assert_eq!(windowed.segments.len(), 2);
        assert_eq!(windowed.z_max, 7.5);
        assert_eq!(windowed.z_top, None);
    }
}
