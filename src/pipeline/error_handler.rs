//! Per-file failure reasons and batch-level reporting of dropped files.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why a file contributed nothing to its batch. Never aborts the batch.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("{} did not settle within {timeout:?} or disappeared", path.display())]
    Unstable { path: PathBuf, timeout: Duration },

    #[error("no usable timestamp for {}: {reason}", path.display())]
    Timestamp { path: PathBuf, reason: String },

    #[error("upload of {} failed: {reason}", path.display())]
    Upload { path: PathBuf, reason: String },
}

impl FileError {
    pub fn path(&self) -> &PathBuf {
        match self {
            FileError::Unstable { path, .. }
            | FileError::Timestamp { path, .. }
            | FileError::Upload { path, .. } => path,
        }
    }
}

/// Log the files a batch dropped: one warning per file, plus a summary line.
pub fn log_dropped_files(dropped: &[FileError], total: usize) {
    if dropped.is_empty() {
        return;
    }
    for e in dropped {
        log::warn!("{}", e);
    }
    log::warn!(
        "Dropped {} of {} files from this batch",
        dropped.len(),
        total
    );
}
