//! Utility helpers for the G-code crate

pub mod file_io;

pub use file_io::{read_gcode_lossy, GcodeFileReader};
