//! Pending candidates between the first event of a burst and dispatch.

use std::collections::HashSet;
use std::path::PathBuf;

/// Append-only buffer of candidate paths in arrival order.
///
/// Duplicates are kept here (raw event count is useful in logs) and collapsed by [`dedup`] when
/// the batch is drained.
#[derive(Debug, Default)]
pub struct EventQueue {
    items: Vec<PathBuf>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.items.push(path);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take everything queued so far, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.items)
    }
}

/// Unique paths, keeping the first arrival of each.
pub fn dedup(items: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
