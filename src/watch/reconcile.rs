//! Catch up on files that arrived while the monitor was down, and keep the snapshot current.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::handler::VideoHandler;
use crate::engine::db_ops::{Snapshot, load_snapshot, load_snapshot_info, open_db, save_snapshot};
use crate::engine::tools::{is_video_path, mtime_ns};

/// Current video files directly inside `dir` (no recursion): name → mtime_ns.
pub fn scan_video_files(dir: &Path) -> Result<Snapshot> {
    let mut files = Snapshot::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_video_path(entry.path()) {
            continue;
        }
        let meta = entry
            .metadata()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        files.insert(
            entry.file_name().to_string_lossy().into_owned(),
            mtime_ns(&meta),
        );
    }
    Ok(files)
}

/// Names present in `current` but not in `last`, sorted. No previous snapshot → nothing.
pub fn new_since(last: Option<&Snapshot>, current: &Snapshot) -> Vec<String> {
    let Some(last) = last else {
        return Vec::new();
    };
    let mut names: Vec<String> = current
        .keys()
        .filter(|name| !last.contains_key(*name))
        .cloned()
        .collect();
    names.sort();
    names
}

/// Snapshot database bound to one watched directory.
pub struct Reconciler {
    dir: PathBuf,
    root_key: String,
    conn: Connection,
}

impl Reconciler {
    pub fn open(dir: &Path, db_path: &Path) -> Result<Self> {
        let conn = open_db(db_path)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            root_key: dir.to_string_lossy().into_owned(),
            conn,
        })
    }

    /// Replay every file that is new since the stored snapshot through `handler`, then rewrite
    /// the snapshot. Returns the replayed paths.
    pub fn reconcile(&mut self, handler: &VideoHandler) -> Result<Vec<PathBuf>> {
        let info = load_snapshot_info(&self.conn, &self.root_key)?;
        let last = match &info {
            Some(_) => Some(load_snapshot(&self.conn).context("load snapshot")?),
            None => {
                info!("No snapshot for {}; first run, nothing to replay", self.dir.display());
                None
            }
        };
        let current = scan_video_files(&self.dir)?;

        let replayed: Vec<PathBuf> = new_since(last.as_ref(), &current)
            .into_iter()
            .map(|name| self.dir.join(name))
            .collect();
        for path in &replayed {
            debug!("Replaying {}", path.display());
            handler.on_created(path, false);
        }
        if !replayed.is_empty() {
            info!("Replayed {} files added while offline", replayed.len());
        }

        save_snapshot(&mut self.conn, &self.root_key, &current)?;
        Ok(replayed)
    }

    /// Rewrite the snapshot from the current listing.
    pub fn refresh(&mut self) -> Result<()> {
        let current = scan_video_files(&self.dir)?;
        let info = save_snapshot(&mut self.conn, &self.root_key, &current)?;
        debug!(
            "Snapshot refreshed: {} files at {}",
            info.file_count, info.last_update
        );
        Ok(())
    }
}
