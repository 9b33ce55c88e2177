//! Conversion between print height and layer index

use layerwatch_core::constants::{DEFAULT_FIRST_LAYER_HEIGHT_MM, DEFAULT_LAYER_HEIGHT_MM};
use layerwatch_core::VisionError;
use serde::{Deserialize, Serialize};

/// Maps a Z height to a zero-based layer index and back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightLayerConverter {
    /// Z of the first printed layer
    pub first_layer_height: f64,
    /// Nominal layer height
    pub layer_height: f64,
}

impl Default for HeightLayerConverter {
    fn default() -> Self {
        Self {
            first_layer_height: DEFAULT_FIRST_LAYER_HEIGHT_MM,
            layer_height: DEFAULT_LAYER_HEIGHT_MM,
        }
    }
}

impl HeightLayerConverter {
    pub fn new(first_layer_height: f64, layer_height: f64) -> Self {
        Self {
            first_layer_height,
            layer_height,
        }
    }

    fn check(&self) -> Result<(), VisionError> {
        if self.layer_height > 0.0 && self.layer_height.is_finite() {
            Ok(())
        } else {
            Err(VisionError::InvalidLayerHeight {
                layer_height: self.layer_height,
            })
        }
    }

    /// `max(0, round((height - first_layer_height) / layer_height))`, with
    /// exact halves rounded to the even layer
    ///
    /// # Errors
    /// Returns [`VisionError::InvalidLayerHeight`] when the layer height is
    /// not strictly positive.
    pub fn layer_for_height(&self, height: f64) -> Result<u32, VisionError> {
        self.check()?;
        let index = ((height - self.first_layer_height) / self.layer_height).round_ties_even();
        if index.is_nan() || index <= 0.0 {
            Ok(0)
        } else if index >= f64::from(u32::MAX) {
            Ok(u32::MAX)
        } else {
            Ok(index as u32)
        }
    }

    /// Nominal Z of the given layer
    pub fn height_for_layer(&self, layer: u32) -> Result<f64, VisionError> {
        self.check()?;
        Ok(self.first_layer_height + f64::from(layer) * self.layer_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_for_height() {
        let conv = HeightLayerConverter::default();
        assert_eq!(conv.layer_for_height(0.2).unwrap(), 0);
        assert_eq!(conv.layer_for_height(10.02).unwrap(), 49);
        assert_eq!(conv.layer_for_height(0.31).unwrap(), 1);
        assert_eq!(conv.layer_for_height(-2.0).unwrap(), 0);
    }

    #[test]
    fn test_halfway_heights_round_to_even() {
        let conv = HeightLayerConverter::new(0.0, 0.25);
        assert_eq!(conv.layer_for_height(0.625).unwrap(), 2);
        assert_eq!(conv.layer_for_height(0.875).unwrap(), 4);
        assert_eq!(conv.layer_for_height(0.125).unwrap(), 0);
    }

    #[test]
    fn test_round_trip_on_layer_boundaries() {
        let conv = HeightLayerConverter::new(0.3, 0.15);
        for layer in [0u32, 1, 7, 120] {
            let z = conv.height_for_layer(layer).unwrap();
            assert_eq!(conv.layer_for_height(z).unwrap(), layer);
        }
    }

    #[test]
    fn test_non_positive_layer_height_is_rejected() {
        for bad in [0.0, -0.2, f64::NAN] {
            let conv = HeightLayerConverter::new(0.2, bad);
            assert!(matches!(
                conv.layer_for_height(1.0),
                Err(VisionError::InvalidLayerHeight { .. })
            ));
            assert!(conv.height_for_layer(3).is_err());
        }
    }
}
