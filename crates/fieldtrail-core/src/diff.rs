//! The change-detection engine
//!
//! [`AuditLog::record_change`] compares a before and after field mapping,
//! stages the differing values as storable primitives, and appends one
//! immutable entry when there is anything to record.

use fieldtrail_core_types::{EntityId, FieldValue};
use tracing::error;

use crate::coerce;
use crate::entry::{AuditEntry, EntryId, FieldMap};
use crate::registration::AuditRegistration;
use crate::store::AuditStore;

/// Optional metadata recorded alongside a change
///
/// `extra` entries are arbitrary caller-supplied values recorded on the entry
/// unconditionally; there is no before-state for them to differ from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditInfo {
    pub operator: Option<String>,
    pub notes: Option<String>,
    pub extra: FieldMap,
}

impl AuditInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Result of a [`AuditLog::record_change`] call
///
/// Both no-op causes leave [`RecordOutcome::entry_id`] empty, but stay
/// distinguishable: `NoChange` means nothing differed, `StoreUnavailable`
/// means a semantic change was detected and the write had to be dropped.
/// A `Recorded` result is best-effort durability, not a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// An entry was written with this identifier
    Recorded(EntryId),
    /// Nothing differed and no extras were supplied; no write attempted
    NoChange,
    /// The store could not be reached; the entry was dropped and logged
    StoreUnavailable,
}

impl RecordOutcome {
    /// The written entry's identifier, if any
    pub fn entry_id(&self) -> Option<EntryId> {
        match self {
            RecordOutcome::Recorded(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether nothing was written
    pub fn is_noop(&self) -> bool {
        self.entry_id().is_none()
    }
}

/// The audit log for one registered entity kind
///
/// Owns the validated registration and an injected store handle; every
/// operation is self-contained, with no state carried between calls.
#[derive(Debug)]
pub struct AuditLog<S> {
    registration: AuditRegistration,
    store: S,
}

impl<S> AuditLog<S> {
    /// Create an audit log over a registration and a store handle
    pub fn new(registration: AuditRegistration, store: S) -> Self {
        Self {
            registration,
            store,
        }
    }

    pub fn registration(&self) -> &AuditRegistration {
        &self.registration
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: AuditStore> AuditLog<S> {
    /// Record the difference between two field mappings
    ///
    /// Walks every key of `after`, stages the values that constitute a
    /// change, merges `info.extra` unconditionally, and inserts one entry if
    /// anything was staged. Identical before/after with no extras is a silent
    /// no-op. A store failure is logged and reported as `StoreUnavailable`;
    /// it never raises.
    pub fn record_change(
        &self,
        id: impl Into<EntityId>,
        before: &FieldMap,
        after: &FieldMap,
        info: AuditInfo,
    ) -> RecordOutcome {
        self.record(id.into(), before, after, info, false)
    }

    pub(crate) fn record(
        &self,
        id: EntityId,
        before: &FieldMap,
        after: &FieldMap,
        info: AuditInfo,
        is_delete: bool,
    ) -> RecordOutcome {
        let mut staged = FieldMap::new();

        for (key, after_value) in after {
            let before_value = before.get(key).cloned().unwrap_or(FieldValue::Null);
            // TODO: confirm whether the first-appearance branch can fold into
            // the inequality check; collapsing them has broken expectations
            // around null handling before, so the two branches stay separate.
            if before_value.is_null() && !after_value.is_null() {
                staged.insert(key.clone(), coerce::storable(after_value.clone()));
            } else if before_value != *after_value {
                staged.insert(key.clone(), coerce::storable(after_value.clone()));
            }
        }

        for (key, value) in info.extra {
            staged.insert(key, coerce::storable(value));
        }

        // A deletion entry always carries its flag, so it is never a no-op.
        if staged.is_empty() && !is_delete {
            return RecordOutcome::NoChange;
        }

        let mut entry = AuditEntry::new(self.registration.descriptor(id));
        entry.operator = info.operator;
        entry.notes = info.notes;
        entry.is_delete = is_delete;
        entry.fields = staged;

        match self.store.insert(&entry) {
            Ok(entry_id) => RecordOutcome::Recorded(entry_id),
            Err(err) => {
                error!(
                    entity = %entry.entity,
                    error = %err,
                    "failed to write audit entry; change dropped"
                );
                RecordOutcome::StoreUnavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, UnavailableStore};
    use fieldtrail_core_types::{EntitySchema, FieldType};

    fn log(store: MemoryStore) -> AuditLog<MemoryStore> {
        let schema = EntitySchema::new("fleet.Courier")
            .with_field("name", FieldType::Text)
            .with_field("deliveries", FieldType::Integer);
        let registration = AuditRegistration::register(schema, ["name", "deliveries"]).unwrap();
        AuditLog::new(registration, store)
    }

    #[test]
    fn test_empty_maps_are_a_noop() {
        let log = log(MemoryStore::new());
        let outcome =
            log.record_change(1i64, &FieldMap::new(), &FieldMap::new(), AuditInfo::new());
        assert_eq!(outcome, RecordOutcome::NoChange);
        assert!(log.store().is_empty());
    }

    #[test]
    fn test_identical_maps_are_a_noop() {
        let log = log(MemoryStore::new());
        let values: FieldMap = [
            ("name".to_string(), FieldValue::Text("Ada".into())),
            ("deliveries".to_string(), FieldValue::Int(3)),
        ]
        .into();
        let outcome = log.record_change(1i64, &values, &values, AuditInfo::new());
        assert_eq!(outcome, RecordOutcome::NoChange);
        assert!(log.store().is_empty());
    }

    #[test]
    fn test_store_failure_yields_unavailable_not_error() {
        let schema = EntitySchema::new("fleet.Courier").with_field("name", FieldType::Text);
        let registration = AuditRegistration::register(schema, ["name"]).unwrap();
        let log = AuditLog::new(registration, UnavailableStore);

        let before = FieldMap::new();
        let after: FieldMap = [("name".to_string(), FieldValue::Text("Ada".into()))].into();
        let outcome = log.record_change(1i64, &before, &after, AuditInfo::new());

        assert_eq!(outcome, RecordOutcome::StoreUnavailable);
        assert!(outcome.is_noop());
        assert_eq!(outcome.entry_id(), None);
    }
}
