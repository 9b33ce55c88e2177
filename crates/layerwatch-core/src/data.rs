//! Data models for toolhead positions and silhouette geometry
//!
//! This module provides:
//! - The four-axis toolhead position (X, Y, Z and cumulative extrusion E)
//! - The XZ point used for side-on silhouette geometry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Toolhead position in millimeters.
///
/// `e` is the cumulative filament length fed so far, not a per-move amount.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
    /// Cumulative extruder position
    pub e: f64,
}

impl Position {
    /// Create a position with explicit axes
    pub fn new(x: f64, y: f64, z: f64, e: f64) -> Self {
        debug_assert!(
            x.is_finite() && y.is_finite() && z.is_finite() && e.is_finite(),
            "Position axes must be finite: x={x}, y={y}, z={z}, e={e}"
        );
        Self { x, y, z, e }
    }

    /// Origin with zero extrusion
    pub fn origin() -> Self {
        Self::default()
    }

    /// Project onto the XZ (front view) plane
    pub fn xz(&self) -> XzPoint {
        XzPoint::new(self.x, self.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X:{:.3} Y:{:.3} Z:{:.3} E:{:.4}",
            self.x, self.y, self.z, self.e
        )
    }
}

/// A point in the side-on (X horizontal, Z vertical) plane, millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XzPoint {
    pub x: f64,
    pub z: f64,
}

impl XzPoint {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

impl fmt::Display for XzPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.z)
    }
}
