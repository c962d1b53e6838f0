use std::sync::Mutex;

use fieldtrail_core_types::{EntityDescriptor, EntityId};

use crate::entry::{AuditEntry, EntryId};
use crate::errors::{AuditError, Result};

/// Equality predicate over the queryable top-level entry fields
///
/// The audit store never needs joins or aggregation; every read is an
/// equality filter over kind, entity id, and the deletion flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryQuery {
    pub kind: Option<String>,
    pub entity_id: Option<EntityId>,
    pub is_delete: Option<bool>,
}

impl EntryQuery {
    /// All entries for one entity
    pub fn for_entity(descriptor: &EntityDescriptor) -> Self {
        Self {
            kind: Some(descriptor.kind.clone()),
            entity_id: Some(descriptor.id.clone()),
            is_delete: None,
        }
    }

    /// All deletion entries of a kind
    pub fn deletions(kind: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            entity_id: None,
            is_delete: Some(true),
        }
    }

    /// Narrow the query to one entity id
    pub fn with_entity_id(mut self, id: EntityId) -> Self {
        self.entity_id = Some(id);
        self
    }

    /// Whether an entry satisfies the predicate
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(kind) = &self.kind {
            if entry.entity.kind != *kind {
                return false;
            }
        }
        if let Some(id) = &self.entity_id {
            if entry.entity.id != *id {
                return false;
            }
        }
        if let Some(is_delete) = self.is_delete {
            if entry.is_delete != is_delete {
                return false;
            }
        }
        true
    }
}

/// Append-only access to the audit collection
///
/// The engine depends on exactly two operations: atomic insert of one
/// document, and filtered retrieval ordered by timestamp ascending (ties
/// resolved to insertion order). There is deliberately no update or delete;
/// entries are immutable once written. Bulk purging for test teardown or
/// retention lives on concrete implementations, outside this contract.
pub trait AuditStore: Send + Sync {
    /// Append one entry, returning its identifier
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the store cannot be reached, `Persistence` for
    /// other storage failures.
    fn insert(&self, entry: &AuditEntry) -> Result<EntryId>;

    /// Entries matching the query, ordered by timestamp then insertion order
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` or `Persistence` as for [`AuditStore::insert`].
    fn find(&self, query: &EntryQuery) -> Result<Vec<AuditEntry>>;
}

impl<T: AuditStore + ?Sized> AuditStore for &T {
    fn insert(&self, entry: &AuditEntry) -> Result<EntryId> {
        (**self).insert(entry)
    }

    fn find(&self, query: &EntryQuery) -> Result<Vec<AuditEntry>> {
        (**self).find(query)
    }
}

impl<T: AuditStore + ?Sized> AuditStore for std::sync::Arc<T> {
    fn insert(&self, entry: &AuditEntry) -> Result<EntryId> {
        (**self).insert(entry)
    }

    fn find(&self, query: &EntryQuery) -> Result<Vec<AuditEntry>> {
        (**self).find(query)
    }
}

/// In-memory audit store
///
/// Mutex-guarded so replay stays safe under concurrent readers. Entries keep
/// their insertion order; `find` stable-sorts by timestamp, which preserves
/// that order for equal stamps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Bulk-remove every entry for one entity, returning how many were removed
    ///
    /// External bulk deletion (test teardown, retention) is the only way audit
    /// entries are ever destroyed; it is not part of the [`AuditStore`]
    /// contract.
    pub fn purge_entity(&self, descriptor: &EntityDescriptor) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|entry| entry.entity != *descriptor);
        before - entries.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AuditStore for MemoryStore {
    fn insert(&self, entry: &AuditEntry) -> Result<EntryId> {
        self.lock().push(entry.clone());
        Ok(entry.id)
    }

    fn find(&self, query: &EntryQuery) -> Result<Vec<AuditEntry>> {
        let mut matched: Vec<AuditEntry> = self
            .lock()
            .iter()
            .filter(|entry| query.matches(entry))
            .cloned()
            .collect();
        matched.sort_by_key(|entry| entry.timestamp);
        Ok(matched)
    }
}

/// A store that refuses every operation
///
/// Stand-in for an unreachable backend in tests of the write-suppression
/// path.
#[derive(Debug, Default)]
pub struct UnavailableStore;

impl AuditStore for UnavailableStore {
    fn insert(&self, _entry: &AuditEntry) -> Result<EntryId> {
        Err(AuditError::StoreUnavailable {
            reason: "store configured as unavailable".to_string(),
        })
    }

    fn find(&self, _query: &EntryQuery) -> Result<Vec<AuditEntry>> {
        Err(AuditError::StoreUnavailable {
            reason: "store configured as unavailable".to_string(),
        })
    }
}
