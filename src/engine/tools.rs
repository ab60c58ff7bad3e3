//! Path and filter utilities

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::utils::config::{CANONICAL_EXTENSION, VIDEO_EXTENSIONS};

/// Lowercased extension without the dot.
pub fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// True for the accepted video containers (case-insensitive).
pub fn is_video_path(path: &Path) -> bool {
    extension_lower(path).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
}

/// True when the file is already in the container every upload is normalized to.
pub fn has_canonical_extension(path: &Path) -> bool {
    extension_lower(path).is_some_and(|ext| ext == CANONICAL_EXTENSION)
}

/// Sibling path the converter writes for `path` (same stem, canonical extension).
pub fn converted_path_for(path: &Path) -> PathBuf {
    path.with_extension(CANONICAL_EXTENSION)
}

/// Final path component as an owned string (lossy). Empty when there is none.
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Modification time in nanoseconds since epoch, 0 if unavailable.
pub fn mtime_ns(meta: &Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}
