//! Logging utilities
//!
//! Standard messages for file-level operations so batch logs line up.

use std::path::Path;
use std::time::Duration;

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file or directory being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Past-tense verb for what happened (e.g. "loaded")
/// * `noun` - What was counted (e.g. "records")
/// * `path` - Path of the file or directory that was operated on
/// * `count` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    noun: &str,
    path: &Path,
    count: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => log::info!(
            "Successfully {} {} {} ({}) in {:.2?}",
            operation,
            count,
            noun,
            path.display(),
            duration
        ),
        None => log::info!(
            "Successfully {} {} {} ({})",
            operation,
            count,
            noun,
            path.display()
        ),
    }
}

/// Log an operation warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `path` - Optional path related to the warning
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}
