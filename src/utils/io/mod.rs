//! IO utilities for file operations
//!
//! Record loading from JSON or Parquet exports, and JSON output of paired
//! subjects and structured reports.

pub mod json;
pub mod parquet;
pub mod paths;

use std::path::Path;

use crate::error::{Result, SpecimenPairError};
use crate::models::record::SpecimenRecord;

pub use json::{read_json, read_json_files, read_records_json, write_json, write_subject_records};
pub use parquet::read_records_parquet;
pub use paths::{InputFormat, find_files_with_extension};

/// Load specimen records, choosing the reader from the file extension
pub fn load_records(path: &Path) -> Result<Vec<SpecimenRecord>> {
    match InputFormat::from_path(path) {
        Some(InputFormat::Json) => read_records_json(path),
        Some(InputFormat::Parquet) => read_records_parquet(path),
        None => Err(SpecimenPairError::path(
            "Unsupported input format (expected .json or .parquet)",
            path,
        )
        .into()),
    }
}
