//! Path utilities for input discovery

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use itertools::Itertools;

use crate::error::util::validate_directory;
use crate::error::{Result, SpecimenPairError};

/// Input layouts the record loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Parquet,
}

impl InputFormat {
    /// Infer the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// All regular files in `dir` whose name ends in `.{extension}`, sorted by name
pub fn find_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    validate_directory(dir, "searching for input files")?;

    let entries = fs::read_dir(dir)
        .map_err(SpecimenPairError::Io)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(SpecimenPairError::Io)
            .with_context(|| format!("Failed to read directory entry in {}", dir.display()))?
            .path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if path.is_file() && matches {
            files.push(path);
        }
    }

    Ok(files.into_iter().sorted().collect_vec())
}
