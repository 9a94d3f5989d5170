//! Error handling for specimen pairing and report extraction.

pub mod util;

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Domain errors raised by the pairing engine and its I/O layer
///
/// Per-record and per-subject data defects (unparsable dates, missing
/// categories) are never reported through this type; they surface as
/// outcomes and counts instead.
#[derive(Debug, thiserror::Error)]
pub enum SpecimenPairError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error encoding or decoding JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// A required input column is absent
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A column exists but has an unsupported type
    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedColumnType {
        /// Column name
        column: String,
        /// Arrow data type rendered as text
        data_type: String,
    },

    /// The pairing configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A filesystem path could not be used for the requested purpose
    #[error("{message}: {}", path.display())]
    Path {
        /// What went wrong
        message: String,
        /// The offending path
        path: PathBuf,
    },

    /// The external extraction component failed for a report
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The external classification component returned an unknown label
    #[error("Classification error: {0}")]
    Classification(String),
}

impl SpecimenPairError {
    /// Create a path error
    pub fn path(message: impl Into<String>, path: &Path) -> Self {
        Self::Path {
            message: message.into(),
            path: path.to_path_buf(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type used across the crate
pub type Result<T> = anyhow::Result<T>;
