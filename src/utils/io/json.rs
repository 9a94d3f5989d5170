//! JSON input and output
//!
//! Records travel as JSON arrays of row objects keyed by export column
//! names. Paired output is one file per subject.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::util::{ensure_directory, safe_open_file, validate_directory};
use crate::error::{Result, SpecimenPairError};
use crate::models::record::SpecimenRecord;
use crate::utils::io::paths::find_files_with_extension;
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Read a JSON array of records
pub fn read_records_json(path: &Path) -> Result<Vec<SpecimenRecord>> {
    let start = Instant::now();
    log_operation_start("Reading records from", path);

    let records: Vec<SpecimenRecord> = read_json(path, "reading specimen records")?;

    log_operation_complete("loaded", "records", path, records.len(), Some(start.elapsed()));
    Ok(records)
}

/// Deserialize a whole JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path, purpose: &str) -> Result<T> {
    let file = safe_open_file(path, purpose)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(SpecimenPairError::Json)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Serialize `value` as pretty JSON, replacing any existing file
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = fs::File::create(path)
        .map_err(SpecimenPairError::Io)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(SpecimenPairError::Json)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))
}

/// File name used for a subject's paired records
///
/// ASCII letters, digits and `-` are kept; every other byte becomes `_XX`
/// (uppercase hex), so distinct identifiers never share a file.
#[must_use]
pub fn subject_file_name(subject_id: &str) -> String {
    let mut safe = String::with_capacity(subject_id.len());
    for byte in subject_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            safe.push(char::from(byte));
        } else {
            safe.push_str(&format!("_{byte:02X}"));
        }
    }
    format!("MRN_{safe}.json")
}

/// Write one subject's paired records into `dir`
///
/// An existing file for the same subject is replaced with a warning.
pub fn write_subject_records(
    dir: &Path,
    subject_id: &str,
    records: &[SpecimenRecord],
) -> Result<PathBuf> {
    ensure_directory(dir, "paired subject output")?;
    let path = dir.join(subject_file_name(subject_id));
    if path.exists() {
        log_warning("Overwriting existing subject file", Some(&path));
    }
    write_json(&path, records)?;
    Ok(path)
}

/// Read every `.json` file in `dir`, skipping files that fail to parse
///
/// A missing directory is an error; an unreadable file is logged and
/// skipped so one bad export does not sink the batch.
pub fn read_json_files<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    validate_directory(dir, "reading JSON files")?;

    let files = find_files_with_extension(dir, "json")?;
    let mut parsed = Vec::with_capacity(files.len());
    for path in &files {
        match read_json::<T>(path, "reading JSON file") {
            Ok(value) => parsed.push(value),
            Err(e) => log_warning(&format!("Skipping unreadable JSON ({e:#})"), Some(path)),
        }
    }

    log_operation_complete("read", "JSON files", dir, parsed.len(), None);
    Ok(parsed)
}
