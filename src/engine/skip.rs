//! Single-use suppression tokens for files the pipeline writes itself.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Paths whose next creation event must be swallowed.
///
/// A token is consumed by the first matching event; a later event for the same path is a new
/// arrival again. This is not a permanent exclusion list.
#[derive(Debug, Default)]
pub struct SkipSet {
    tokens: HashSet<PathBuf>,
}

impl SkipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect one self-inflicted creation event for `path`.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.tokens.insert(path)
    }

    /// Consume the token for `path`. True when the event should be suppressed.
    pub fn consume(&mut self, path: &Path) -> bool {
        self.tokens.remove(path)
    }

    /// Drop a token without an event (batch housekeeping).
    pub fn remove(&mut self, path: &Path) -> bool {
        self.tokens.remove(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.tokens.contains(path)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
