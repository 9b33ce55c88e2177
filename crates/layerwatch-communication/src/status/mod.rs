//! Height sources

pub mod moonraker;

use async_trait::async_trait;
use layerwatch_core::StatusError;

/// Anything that can report the current toolhead Z in millimeters
#[async_trait]
pub trait HeightSource: Send + Sync {
    /// Query the current height
    async fn query_height(&self) -> Result<f64, StatusError>;

    /// Current height, or `None` when the source is unavailable.
    ///
    /// Failures are logged here so polling loops can simply skip the tick.
    async fn current_height(&self) -> Option<f64> {
        match self.query_height().await {
            Ok(z) => Some(z),
            Err(e) => {
                tracing::warn!("No live height available: {}", e);
                None
            }
        }
    }
}

/// Height source that always reports the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedHeight(pub f64);

#[async_trait]
impl HeightSource for FixedHeight {
    async fn query_height(&self) -> Result<f64, StatusError> {
        Ok(self.0)
    }
}
