//! Open and load the snapshot database.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use super::{SCHEMA, Snapshot, SnapshotInfo, WAL_PRAGMAS};

/// Enable WAL and apply schema to an open connection (idempotent).
fn apply_wal_and_schema(conn: &Connection) -> Result<()> {
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .context("enable WAL")?;
    conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(())
}

/// Open or create the snapshot DB and ensure schema + WAL.
pub fn open_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("open snapshot database {}", path.display()))?;
    apply_wal_and_schema(&conn)?;
    Ok(conn)
}

/// Open an in-memory DB with the same schema (tests, or running without a state file).
pub fn open_db_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory database")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(conn)
}

/// Load the stored snapshot: name -> mtime_ns.
pub fn load_snapshot(conn: &Connection) -> Result<Snapshot> {
    let mut stmt = conn.prepare("SELECT name, mtime_ns FROM files")?;
    let rows = stmt.query_map([], |row| {
        let name: String = row.get(0)?;
        let mtime_ns: i64 = row.get(1)?;
        Ok((name, mtime_ns))
    })?;
    let mut map = Snapshot::new();
    for row in rows {
        let (name, mtime_ns) = row?;
        map.insert(name, mtime_ns);
    }
    Ok(map)
}

/// Info row for `root_path`, or None when no snapshot was ever written for it (first run).
pub fn load_snapshot_info(conn: &Connection, root_path: &str) -> Result<Option<SnapshotInfo>> {
    let s: String = match conn.query_row(
        "SELECT data FROM snapshot_info WHERE root_path = ?1",
        [root_path],
        |row| row.get(0),
    ) {
        Ok(data) => data,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let info: SnapshotInfo = serde_json::from_str(&s).context("parse snapshot info JSON")?;
    Ok(Some(info))
}
