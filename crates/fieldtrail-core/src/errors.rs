use thiserror::Error;

/// Result type alias using AuditError
pub type Result<T> = std::result::Result<T, AuditError>;

/// Error taxonomy for audit operations
///
/// Write-path store failures never surface as errors: the diff engine
/// converts them to [`RecordOutcome::StoreUnavailable`](crate::RecordOutcome)
/// at the boundary. Read-path failures propagate, so callers can tell "no
/// data" apart from "store unreachable".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    /// The backing store could not be reached
    #[error("audit store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A logged-field name is not declared on the entity schema
    ///
    /// Raised at registration time, before any entity of the kind can be
    /// audited; never deferred to write time.
    #[error("cannot log field {field:?}: not declared on entity kind {kind:?}")]
    UnknownLoggedField { kind: String, field: String },

    /// A stored value could not be converted to the field's declared type
    #[error("cannot coerce stored value for field {field:?}: {reason}")]
    CoercionFailure { field: String, reason: String },

    /// Store-layer failure other than unavailability
    #[error("persistence error: {reason}")]
    Persistence { reason: String },

    /// Document encoding or decoding failure
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        AuditError::Serialization {
            reason: err.to_string(),
        }
    }
}
