//! Error handling for LayerWatch
//!
//! Provides error types for each layer of the application:
//! - G-Code errors (reading toolpath files, render options)
//! - Vision errors (image I/O, pipeline configuration, height conversion)
//! - Status errors (printer status queries)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Malformed tokens never produce an error; these cover the file and the
/// caller-supplied render parameters.
#[derive(Error, Debug, Clone)]
pub enum GcodeError {
    /// The toolpath file could not be read
    #[error("Failed to read G-code file {path}: {reason}")]
    FileError {
        /// Path of the file that failed.
        path: String,
        /// The underlying reason.
        reason: String,
    },

    /// Render options are unusable (non-positive bed width or scale)
    #[error("Invalid render options: {reason}")]
    InvalidRenderOptions {
        /// Why the options were rejected.
        reason: String,
    },

    /// The rendered silhouette could not be written
    #[error("Failed to write silhouette {path}: {reason}")]
    WriteFailed {
        /// Destination path.
        path: String,
        /// The underlying reason.
        reason: String,
    },
}

/// Vision error type
///
/// Covers the milestone selector, height/layer conversion and the
/// defect highlighting pipeline.
#[derive(Error, Debug, Clone)]
pub enum VisionError {
    /// Pipeline or selector configuration is unusable
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// Height/layer conversion requested with a non-positive layer height
    #[error("Layer height must be > 0, got {layer_height}")]
    InvalidLayerHeight {
        /// The offending layer height in millimeters.
        layer_height: f64,
    },

    /// Region-of-interest mask does not match the reference image
    #[error("Mask is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    MaskSizeMismatch {
        /// Reference width.
        expected_width: u32,
        /// Reference height.
        expected_height: u32,
        /// Mask width.
        actual_width: u32,
        /// Mask height.
        actual_height: u32,
    },

    /// An image could not be decoded
    #[error("Failed to read image {path}: {reason}")]
    ImageRead {
        /// Path of the image.
        path: String,
        /// The underlying reason.
        reason: String,
    },

    /// An image could not be encoded or written
    #[error("Failed to write image {path}: {reason}")]
    ImageWrite {
        /// Path of the image.
        path: String,
        /// The underlying reason.
        reason: String,
    },
}

/// Printer status error type
///
/// Callers in the polling loop downgrade these to "no height available".
#[derive(Error, Debug, Clone)]
pub enum StatusError {
    /// The request could not be sent or timed out
    #[error("Status request to {url} failed: {reason}")]
    Request {
        /// The queried URL.
        url: String,
        /// The underlying reason.
        reason: String,
    },

    /// The printer answered with a non-success HTTP status
    #[error("Status request to {url} returned HTTP {status}")]
    HttpStatus {
        /// The queried URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The JSON body did not contain a numeric Z position
    #[error("Malformed status response: {reason}")]
    MalformedResponse {
        /// What was missing or wrong.
        reason: String,
    },
}

/// Main error type for LayerWatch
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Vision error
    #[error(transparent)]
    Vision(#[from] VisionError),

    /// Printer status error
    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_error_display() {
        let err = VisionError::InvalidLayerHeight { layer_height: 0.0 };
        assert_eq!(err.to_string(), "Layer height must be > 0, got 0");

        let err = VisionError::MaskSizeMismatch {
            expected_width: 640,
            expected_height: 480,
            actual_width: 320,
            actual_height: 240,
        };
        assert_eq!(err.to_string(), "Mask is 320x240, expected 640x480");
    }

    #[test]
    fn test_status_error_display() {
        let err = StatusError::HttpStatus {
            url: "http://printer:7125/printer/objects/query".to_string(),
            status: 503,
        };
        assert_eq!(
            err.to_string(),
            "Status request to http://printer:7125/printer/objects/query returned HTTP 503"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = GcodeError::InvalidRenderOptions {
            reason: "scale must be > 0".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Gcode(_)));

        let err: Error = VisionError::InvalidConfig {
            reason: "kernel".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Vision(_)));
        assert_eq!(err.to_string(), "Invalid configuration: kernel");

        let err: Error = StatusError::MalformedResponse {
            reason: "missing result".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Status(_)));
    }
}
