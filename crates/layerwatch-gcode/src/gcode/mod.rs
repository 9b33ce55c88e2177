//! G-Code interpretation
//!
//! This module provides:
//! - Comment stripping and word tokenizing
//! - Distance-mode tracking (G90/G91, M82/M83)
//! - Position tracking and extrusion move detection
//! - Layer height resolution from metadata or Z deltas

pub mod layer_height;
pub mod motion;
pub mod parser;
pub mod words;

pub use layer_height::*;
pub use motion::*;
pub use parser::*;
pub use words::*;
