//! Export sink trait and error types
//!
//! Sinks receive the finished CSV bytes and a file name and decide where
//! they end up.

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export: no comments were collected")]
    Empty,

    #[error("Failed to format CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// A serialized export ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Destination for exported files
pub trait ExportSink {
    /// Saves `bytes` under `filename`, returning where they were written
    fn save(&self, bytes: &[u8], filename: &str) -> ExportResult<PathBuf>;
}

/// Writes exports into a directory, creating it if needed
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl ExportSink for DirectorySink {
    fn save(&self, bytes: &[u8], filename: &str) -> ExportResult<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(filename);
        fs::write(&path, bytes)?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
