//! Record lifecycle helpers
//!
//! The host application's persistence layer owns the actual create, update,
//! and delete of its records; these helpers are the integration points it
//! calls around those writes so each one lands in the audit log with the
//! right before-state.

use fieldtrail_core_types::EntityId;

use crate::diff::{AuditInfo, AuditLog, RecordOutcome};
use crate::entry::FieldMap;
use crate::store::AuditStore;

/// Note recorded on every deletion entry
pub const DELETE_NOTE: &str = "Object deleted. These are the attributes at delete time.";

impl<S: AuditStore> AuditLog<S> {
    /// Record the creation of a record
    ///
    /// The before-state is the all-null map over the logged set, so every
    /// non-null initial value is recorded. Call after the primary write, once
    /// the assigned identifier is known.
    pub fn record_create(
        &self,
        id: impl Into<EntityId>,
        after: &FieldMap,
        info: AuditInfo,
    ) -> RecordOutcome {
        let before = self.registration().null_baseline();
        self.record(id.into(), &before, after, info, false)
    }

    /// Record an update against the record's re-read prior state
    ///
    /// `before` is the host's re-read of current persisted values. `None`
    /// means no prior row was found - possible when racing a concurrent
    /// delete - and degrades to the all-null baseline, accepted as
    /// best-effort.
    pub fn record_update(
        &self,
        id: impl Into<EntityId>,
        before: Option<&FieldMap>,
        after: &FieldMap,
        info: AuditInfo,
    ) -> RecordOutcome {
        let baseline;
        let before = match before {
            Some(values) => values,
            None => {
                baseline = self.registration().null_baseline();
                &baseline
            }
        };
        self.record(id.into(), before, after, info, false)
    }

    /// Record the deletion of a record
    ///
    /// `snapshot` is the full field state at delete time; with an empty
    /// before-state every non-null value is recorded. The fixed delete note
    /// is always written, with any caller notes appended on a new line.
    /// Extra metadata is not recorded on deletion entries.
    pub fn record_delete(
        &self,
        id: impl Into<EntityId>,
        snapshot: &FieldMap,
        info: AuditInfo,
    ) -> RecordOutcome {
        let notes = match info.notes {
            None => DELETE_NOTE.to_string(),
            Some(notes) => format!("{DELETE_NOTE}\n{notes}"),
        };

        let info = AuditInfo {
            operator: info.operator,
            notes: Some(notes),
            extra: FieldMap::new(),
        };

        self.record(id.into(), &FieldMap::new(), snapshot, info, true)
    }
}
