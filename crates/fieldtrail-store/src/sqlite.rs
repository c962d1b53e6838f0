//! SQLite-backed audit store
//!
//! [`SqliteStore`] keeps a lazily-opened, cached connection handle. After an
//! unavailability failure against a file-backed database the handle is
//! dropped, so the next caller transparently reopens; there is no background
//! retry loop.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::DateTime;
use fieldtrail_core::{AuditEntry, AuditError, AuditStore, EntryId, EntryQuery};
use fieldtrail_core_types::EntityDescriptor;
use rusqlite::Connection;

use crate::db;
use crate::errors::{corrupt_row, from_rusqlite, Result};

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Audit store over a SQLite database
pub struct SqliteStore {
    location: Location,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Store backed by a database file
    ///
    /// No I/O happens here; the connection is established on first use and
    /// cached. A failed operation that indicates unavailability drops the
    /// cached handle so the next use reconnects.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            conn: Mutex::new(None),
        }
    }

    /// Store backed by an in-memory database
    ///
    /// Connects eagerly: the data lives in the connection, so the handle is
    /// held for the lifetime of the store and never dropped on failure.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = db::open_in_memory()?;
        db::configure(&conn)?;
        db::bootstrap(&conn)?;

        Ok(Self {
            location: Location::Memory,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Bulk-remove every entry for one entity, returning how many went
    ///
    /// Teardown/retention helper; deliberately not part of the
    /// [`AuditStore`] contract, which is append-only.
    pub fn purge_entity(&self, descriptor: &EntityDescriptor) -> Result<usize> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM audit_entries WHERE entity_kind = ?1 AND entity_id = ?2",
                rusqlite::params![descriptor.kind, descriptor.id.as_str()],
            )
            .map_err(|err| from_rusqlite("purge_entity", err))
        })
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn connect(&self) -> Result<Connection> {
        let conn = match &self.location {
            Location::File(path) => db::open(path)?,
            Location::Memory => db::open_in_memory()?,
        };
        db::configure(&conn)?;
        db::bootstrap(&conn)?;
        Ok(conn)
    }

    fn with_conn<T>(&self, op: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock();

        if guard.is_none() {
            *guard = Some(self.connect()?);
        }

        let result = match guard.as_ref() {
            Some(conn) => op(conn),
            None => Err(AuditError::StoreUnavailable {
                reason: "no database handle".to_string(),
            }),
        };

        if matches!(result, Err(AuditError::StoreUnavailable { .. }))
            && matches!(self.location, Location::File(_))
        {
            // Reconnect-on-next-use: discard the handle, keep the failure.
            *guard = None;
        }

        result
    }
}

impl AuditStore for SqliteStore {
    fn insert(&self, entry: &AuditEntry) -> Result<EntryId> {
        self.with_conn(|conn| {
            let fields_json = serde_json::to_string(&entry.fields)?;

            conn.execute(
                "INSERT INTO audit_entries
                     (id, entity_kind, entity_id, stamp_micros, operator, notes, is_delete, fields)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    entry.id.to_string(),
                    entry.entity.kind,
                    entry.entity.id.as_str(),
                    entry.timestamp.timestamp_micros(),
                    entry.operator,
                    entry.notes,
                    if entry.is_delete { 1 } else { 0 },
                    fields_json,
                ],
            )
            .map_err(|err| from_rusqlite("insert", err))?;

            Ok(entry.id)
        })
    }

    fn find(&self, query: &EntryQuery) -> Result<Vec<AuditEntry>> {
        self.with_conn(|conn| {
            let mut sql = String::from(
                "SELECT id, entity_kind, entity_id, stamp_micros, operator, notes, is_delete, fields
                 FROM audit_entries",
            );

            let is_delete_param = query.is_delete.map(|flag| if flag { 1i64 } else { 0 });
            let entity_id_param = query.entity_id.as_ref().map(|id| id.as_str());
            let mut clauses: Vec<&str> = Vec::new();
            let mut params: Vec<&dyn rusqlite::ToSql> = Vec::new();

            if let Some(kind) = &query.kind {
                clauses.push("entity_kind = ?");
                params.push(kind);
            }
            if let Some(id) = &entity_id_param {
                clauses.push("entity_id = ?");
                params.push(id);
            }
            if let Some(flag) = &is_delete_param {
                clauses.push("is_delete = ?");
                params.push(flag);
            }

            if !clauses.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" AND "));
            }
            sql.push_str(" ORDER BY stamp_micros ASC, rowid ASC");

            let mut stmt = conn
                .prepare(&sql)
                .map_err(|err| from_rusqlite("find", err))?;

            let rows = stmt
                .query_map(rusqlite::params_from_iter(params), |row| {
                    Ok(RawRow {
                        id: row.get(0)?,
                        entity_kind: row.get(1)?,
                        entity_id: row.get(2)?,
                        stamp_micros: row.get(3)?,
                        operator: row.get(4)?,
                        notes: row.get(5)?,
                        is_delete: row.get(6)?,
                        fields: row.get(7)?,
                    })
                })
                .map_err(|err| from_rusqlite("find", err))?;

            let mut entries = Vec::new();
            for row in rows {
                let row = row.map_err(|err| from_rusqlite("find", err))?;
                entries.push(row.into_entry()?);
            }

            Ok(entries)
        })
    }
}

struct RawRow {
    id: String,
    entity_kind: String,
    entity_id: String,
    stamp_micros: i64,
    operator: Option<String>,
    notes: Option<String>,
    is_delete: i64,
    fields: String,
}

impl RawRow {
    fn into_entry(self) -> Result<AuditEntry> {
        let id: EntryId = self
            .id
            .parse()
            .map_err(|err| corrupt_row("id", err))?;
        let timestamp = DateTime::from_timestamp_micros(self.stamp_micros)
            .ok_or_else(|| corrupt_row("stamp_micros", self.stamp_micros))?;
        let fields = serde_json::from_str(&self.fields)?;

        Ok(AuditEntry {
            id,
            entity: EntityDescriptor::new(self.entity_kind, self.entity_id),
            timestamp,
            operator: self.operator,
            notes: self.notes,
            is_delete: self.is_delete != 0,
            fields,
        })
    }
}
