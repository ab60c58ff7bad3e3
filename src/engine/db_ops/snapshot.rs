//! Rewrite the snapshot in one transaction.

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::{INSERT_FILE_SQL, Snapshot};

/// Bookkeeping stored next to the file rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    /// Local time of the last rewrite, `YYYY-MM-DD HH:MM:SS`.
    pub last_update: String,
    pub file_count: usize,
}

/// Replace the stored snapshot with `files` and stamp `root_path`'s info row.
pub fn save_snapshot(
    conn: &mut Connection,
    root_path: &str,
    files: &Snapshot,
) -> Result<SnapshotInfo> {
    let info = SnapshotInfo {
        last_update: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        file_count: files.len(),
    };
    let json = serde_json::to_string(&info).context("serialize snapshot info")?;

    let tx = conn.transaction().context("begin snapshot transaction")?;
    tx.execute("DELETE FROM files", []).context("clear files")?;
    {
        let mut stmt = tx.prepare(INSERT_FILE_SQL).context("prepare insert")?;
        for (name, mtime_ns) in files {
            stmt.execute((name.as_str(), *mtime_ns))
                .with_context(|| format!("insert {name}"))?;
        }
    }
    tx.execute(
        "INSERT OR REPLACE INTO snapshot_info (root_path, data) VALUES (?1, ?2)",
        [root_path, json.as_str()],
    )
    .context("write snapshot info")?;
    tx.commit().context("commit snapshot")?;
    Ok(info)
}
