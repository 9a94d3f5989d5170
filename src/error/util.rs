//! Utility functions for error handling
//!
//! File and directory helpers that attach the purpose of the access to any
//! failure, so batch logs say what was being attempted.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::Context;

use crate::error::{Result, SpecimenPairError};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(SpecimenPairError::path("File not found", path))
            .with_context(|| format!("Needed for: {purpose}"));
    }

    if !path.is_file() {
        return Err(SpecimenPairError::path("Path is not a file", path))
            .with_context(|| format!("Expected a file for: {purpose}"));
    }

    fs::File::open(path).map_err(|e| {
        let context = match e.kind() {
            io::ErrorKind::PermissionDenied => {
                "Permission denied - check file permissions".to_string()
            }
            _ => format!("Failed to open file for: {purpose}"),
        };
        anyhow::Error::new(SpecimenPairError::Io(e))
            .context(format!("{context}: {}", path.display()))
    })
}

/// Check if a directory exists and is readable, with rich error information
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(SpecimenPairError::path("Directory not found", path))
            .with_context(|| format!("Needed for: {purpose}"));
    }

    if !path.is_dir() {
        return Err(SpecimenPairError::path("Path is not a directory", path))
            .with_context(|| format!("Expected a directory for: {purpose}"));
    }

    fs::read_dir(path)
        .map(|_| ())
        .map_err(SpecimenPairError::Io)
        .with_context(|| format!("Failed to access directory for {purpose}: {}", path.display()))
}

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_directory(path: &Path, purpose: &str) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path)
        .map_err(SpecimenPairError::Io)
        .with_context(|| format!("Failed to create directory for {purpose}: {}", path.display()))
}

/// Safely read a file to string with rich error information
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    let mut file = safe_open_file(path, purpose)?;

    let mut content = String::new();
    match io::Read::read_to_string(&mut file, &mut content) {
        Ok(_) => Ok(content),
        Err(e) => {
            let context = match e.kind() {
                io::ErrorKind::InvalidData => {
                    "File contains invalid UTF-8 data - cannot read as text".to_string()
                }
                _ => format!("Failed to read file content for: {purpose}"),
            };
            Err(anyhow::Error::new(SpecimenPairError::Io(e))
                .context(format!("{context}: {}", path.display())))
        }
    }
}
