//! G-code file reading
//!
//! Slicer output is nominally ASCII, but some headers carry stray bytes
//! (thumbnails, vendor blobs, Latin-1 names). Undecodable bytes are dropped
//! instead of failing the read.

use layerwatch_core::GcodeError;
use std::fs;
use std::path::{Path, PathBuf};

/// Warn above this size, since the whole file is held in memory
const LARGE_FILE_BYTES: u64 = 500 * 1024 * 1024;

/// G-code file reader
#[derive(Debug, Clone)]
pub struct GcodeFileReader {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFileReader {
    /// Open a reader for an existing regular file
    ///
    /// # Errors
    /// Returns error if the path does not exist or is not a file
    pub fn new(path: impl AsRef<Path>) -> Result<Self, GcodeError> {
        let path = path.as_ref().to_path_buf();

        if !path.is_file() {
            return Err(GcodeError::FileError {
                path: path.display().to_string(),
                reason: if path.exists() {
                    "not a regular file".to_string()
                } else {
                    "file does not exist".to_string()
                },
            });
        }

        let file_size = fs::metadata(&path)
            .map_err(|e| GcodeError::FileError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
            .len();

        Ok(Self { path, file_size })
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file, dropping bytes that are not valid UTF-8
    pub fn read_lossy(&self) -> Result<String, GcodeError> {
        if self.file_size > LARGE_FILE_BYTES {
            tracing::warn!(
                "Reading very large file ({}MB) into memory",
                self.file_size / (1024 * 1024)
            );
        }

        let bytes = fs::read(&self.path).map_err(|e| GcodeError::FileError {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(decode_lossy(&bytes))
    }
}

/// UTF-8 decode that removes invalid sequences rather than replacing them
pub fn decode_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(bytes)
            .chars()
            .filter(|&c| c != char::REPLACEMENT_CHARACTER)
            .collect(),
    }
}

/// Read a G-code file, tolerating undecodable bytes
pub fn read_gcode_lossy(path: impl AsRef<Path>) -> Result<String, GcodeError> {
    GcodeFileReader::new(path)?.read_lossy()
}
