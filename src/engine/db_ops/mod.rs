//! Snapshot database: schema, open, load, and rewrite of the reconciliation snapshot.

mod connection;
mod snapshot;

pub use connection::{load_snapshot, load_snapshot_info, open_db, open_db_in_memory};
pub use snapshot::{SnapshotInfo, save_snapshot};

use std::collections::HashMap;

/// File name → mtime (ns since epoch) for every video file in the watched directory.
pub type Snapshot = HashMap<String, i64>;

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 1000;
        PRAGMA journal_size_limit = 8388608;
        "#;

/// Insert statement for the files table.
pub(crate) const INSERT_FILE_SQL: &str =
    "INSERT OR REPLACE INTO files (name, mtime_ns) VALUES (?1, ?2)";

/// Schema for files and snapshot_info tables.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    name TEXT PRIMARY KEY,
    mtime_ns INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS snapshot_info (
    root_path TEXT PRIMARY KEY,
    data TEXT NOT NULL
);
"#;
