//! # LayerWatch Core
//!
//! Core types, constants and error handling shared by every LayerWatch crate.
//! Provides the toolhead position model, the XZ point type used by the
//! silhouette renderer, and the unified error hierarchy.

pub mod constants;
pub mod data;
pub mod error;

pub use data::{Position, XzPoint};

pub use error::{Error, GcodeError, Result, StatusError, VisionError};
