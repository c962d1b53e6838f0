//! Log reconstruction
//!
//! Replays the ordered entry sequence of one entity into cumulative
//! per-field change history, and serves the two point-in-time reads built on
//! the same ordering: the creation snapshot and the deletion listing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use fieldtrail_core_types::{EntityDescriptor, EntityId, FieldValue};

use crate::coerce;
use crate::diff::AuditLog;
use crate::entry::{AuditEntry, EntryId, FieldMap};
use crate::errors::Result;
use crate::registration::AuditRegistration;
use crate::store::{AuditStore, EntryQuery};

/// Previous and new value of one tracked field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDelta {
    pub from: FieldValue,
    pub to: FieldValue,
}

/// One replayed log entry
///
/// Tracked fields appear in `changes` as deltas against the running
/// last-seen values; everything else the entry carried is copied through in
/// `direct` as stored. `changes` is empty for entries that recorded no
/// tracked field (extras-only writes).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: EntryId,
    pub entity: EntityDescriptor,
    pub timestamp: DateTime<Utc>,
    pub operator: Option<String>,
    pub notes: Option<String>,
    pub is_delete: bool,
    pub direct: FieldMap,
    pub changes: BTreeMap<String, FieldDelta>,
}

/// Pull-based iterator over an entity's change history
///
/// Finite and safe to abandon mid-iteration; a fresh [`AuditLog::replay`]
/// call re-reads the store. The fold carries last-seen values per tracked
/// field, starting from all-null, so the first appearance of a field reports
/// a delta from `Null`.
pub struct History<'a> {
    registration: &'a AuditRegistration,
    entries: std::vec::IntoIter<AuditEntry>,
    last_seen: BTreeMap<String, FieldValue>,
}

impl Iterator for History<'_> {
    type Item = Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        Some(self.fold(entry))
    }
}

impl History<'_> {
    fn fold(&mut self, entry: AuditEntry) -> Result<HistoryEntry> {
        let mut direct = FieldMap::new();
        let mut changes = BTreeMap::new();

        for (field, value) in entry.fields {
            if self.registration.is_logged(&field) {
                let new_value = coerce::to_declared(self.registration, &field, value)?;
                let previous = self
                    .last_seen
                    .insert(field.clone(), new_value.clone())
                    .unwrap_or(FieldValue::Null);
                changes.insert(
                    field,
                    FieldDelta {
                        from: previous,
                        to: new_value,
                    },
                );
            } else {
                direct.insert(field, value);
            }
        }

        Ok(HistoryEntry {
            id: entry.id,
            entity: entry.entity,
            timestamp: entry.timestamp,
            operator: entry.operator,
            notes: entry.notes,
            is_delete: entry.is_delete,
            direct,
            changes,
        })
    }
}

impl<S: AuditStore> AuditLog<S> {
    /// Replay the full change history of one entity
    ///
    /// Entries come back ordered by timestamp ascending (insertion order for
    /// ties). Each item coerces its tracked values to their declared types
    /// and folds them into `(previous, new)` deltas.
    ///
    /// # Errors
    ///
    /// Store failures surface here rather than as an empty sequence;
    /// per-entry coercion failures surface from the iterator.
    pub fn replay(&self, id: impl Into<EntityId>) -> Result<History<'_>> {
        let descriptor = self.registration().descriptor(id);
        let entries = self.store().find(&EntryQuery::for_entity(&descriptor))?;

        Ok(History {
            registration: self.registration(),
            entries: entries.into_iter(),
            last_seen: BTreeMap::new(),
        })
    }

    /// The entity's earliest entry, with stored values coerced back to their
    /// declared types
    ///
    /// `None` when no entries exist for the entity; that is a normal outcome
    /// (for instance after a retention purge), not an error.
    ///
    /// # Errors
    ///
    /// Store and coercion failures propagate.
    pub fn creation_snapshot(&self, id: impl Into<EntityId>) -> Result<Option<AuditEntry>> {
        let descriptor = self.registration().descriptor(id);
        let mut entries = self.store().find(&EntryQuery::for_entity(&descriptor))?;

        if entries.is_empty() {
            return Ok(None);
        }

        let earliest = entries.remove(0);
        self.coerced(earliest).map(Some)
    }

    /// Deletion entries of this kind, optionally narrowed to one entity id
    ///
    /// Each entry comes back with inbound coercion applied.
    ///
    /// # Errors
    ///
    /// Store and coercion failures propagate.
    pub fn deleted_entities(&self, id: Option<&EntityId>) -> Result<Vec<AuditEntry>> {
        let mut query = EntryQuery::deletions(self.registration().kind());
        if let Some(id) = id {
            query = query.with_entity_id(id.clone());
        }

        self.store()
            .find(&query)?
            .into_iter()
            .map(|entry| self.coerced(entry))
            .collect()
    }

    fn coerced(&self, mut entry: AuditEntry) -> Result<AuditEntry> {
        entry.fields = coerce::document_to_declared(self.registration(), &entry.fields)?;
        Ok(entry)
    }
}
