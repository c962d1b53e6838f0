//! fieldtrail store - SQLite persistence for the audit collection
//!
//! Provides:
//! - Connection helpers and schema bootstrap for the `audit_entries` table
//! - [`SqliteStore`], an [`AuditStore`](fieldtrail_core::AuditStore)
//!   implementation with a lazily-opened, cached connection handle that is
//!   dropped on unavailability and reopened on the next use

pub mod db;
pub mod errors;
pub mod sqlite;

// Re-export key types
pub use sqlite::SqliteStore;
