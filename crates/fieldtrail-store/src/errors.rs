//! Error handling for fieldtrail-store
//!
//! Maps rusqlite failures into the core [`AuditError`] taxonomy: failures
//! that mean "the database cannot be reached right now" become
//! `StoreUnavailable` (and cause the cached handle to be dropped); everything
//! else is `Persistence`.

use fieldtrail_core::AuditError;
use rusqlite::ErrorCode;

/// Result type alias using AuditError
pub type Result<T> = fieldtrail_core::Result<T>;

/// Whether a rusqlite error indicates the database itself is unreachable
pub fn is_unavailable(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(
            ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied
                | ErrorCode::DiskFull,
        )
    )
}

/// Convert a rusqlite error, classifying unavailability
pub fn from_rusqlite(operation: &str, err: rusqlite::Error) -> AuditError {
    if is_unavailable(&err) {
        AuditError::StoreUnavailable {
            reason: format!("{operation}: {err}"),
        }
    } else {
        AuditError::Persistence {
            reason: format!("{operation}: {err}"),
        }
    }
}

/// Create an error for a row that cannot be decoded back into an entry
pub fn corrupt_row(column: &str, detail: impl std::fmt::Display) -> AuditError {
    AuditError::Persistence {
        reason: format!("cannot decode stored column {column}: {detail}"),
    }
}
