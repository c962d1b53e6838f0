//! Database connection management
//!
//! Utilities for opening and preparing SQLite connections that back the
//! audit collection.

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::errors::{from_rusqlite, Result};

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let conn =
        Connection::open(path.as_ref()).map_err(|err| from_rusqlite("open", err))?;
    debug!(path = %path.as_ref().display(), "opened audit database");
    Ok(conn)
}

/// Open an in-memory SQLite database (for testing and ephemeral use)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(|err| from_rusqlite("open_in_memory", err))
}

/// Configure a connection with the settings the audit workload wants
pub fn configure(conn: &Connection) -> Result<()> {
    // WAL keeps concurrent replay readers off the writer's back
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|err| from_rusqlite("configure", err))?;

    Ok(())
}

/// Create the audit schema if it does not exist
///
/// The queryable identity fields are real columns; the staged field values
/// live in a JSON document column. Reads order by `(stamp_micros, rowid)` so
/// entries with equal timestamps keep their insertion order.
pub fn bootstrap(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS audit_entries (
             id           TEXT PRIMARY KEY,
             entity_kind  TEXT NOT NULL,
             entity_id    TEXT NOT NULL,
             stamp_micros INTEGER NOT NULL,
             operator     TEXT,
             notes        TEXT,
             is_delete    INTEGER NOT NULL DEFAULT 0,
             fields       TEXT NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_audit_entries_entity
             ON audit_entries (entity_kind, entity_id, stamp_micros);",
    )
    .map_err(|err| from_rusqlite("bootstrap", err))?;

    Ok(())
}
