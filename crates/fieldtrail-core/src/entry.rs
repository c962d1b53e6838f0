use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use fieldtrail_core_types::{EntityDescriptor, FieldValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field name to value mapping, ordered for deterministic iteration
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Identifier assigned to an audit entry when it is staged for insert
///
/// UUIDv7, so identifiers sort roughly by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// One immutable document in the audit store
///
/// Created exactly once by the diff engine, never mutated afterwards. The
/// `fields` map carries the new value of every field that differed from its
/// prior state, plus any caller-supplied extra metadata, all as storable
/// primitives (outbound coercion already applied).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entry identifier, assigned before insert
    pub id: EntryId,

    /// Which entity this entry belongs to
    pub entity: EntityDescriptor,

    /// Creation instant of the entry
    pub timestamp: DateTime<Utc>,

    /// Who or what performed the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    /// Free-form notes recorded against the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Set on deletion entries only
    #[serde(default)]
    pub is_delete: bool,

    /// Changed-field values and extra metadata, as stored primitives
    pub fields: FieldMap,
}

impl AuditEntry {
    /// Stage a new entry for the given entity, stamped with the current time
    pub fn new(entity: EntityDescriptor) -> Self {
        Self {
            id: EntryId::generate(),
            entity,
            timestamp: Utc::now(),
            operator: None,
            notes: None,
            is_delete: false,
            fields: FieldMap::new(),
        }
    }
}
