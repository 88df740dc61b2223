//! Fatal error conditions of a monitoring run
//!
//! Anything listed here aborts the run before a report is produced. Per-file,
//! per-line and per-pattern problems are carried as values inside the scan
//! results instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("log directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("log directory {} could not be read: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {kind} regex '{pattern}': {source}")]
    InvalidRegex {
        kind: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("a worker thread panicked during {0}")]
    WorkerPanic(&'static str),
}
