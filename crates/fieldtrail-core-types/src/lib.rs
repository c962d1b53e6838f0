//! Core types shared across the fieldtrail crates
//!
//! This crate provides the foundational types the audit engine and the
//! storage layer both depend on:
//!
//! - **Field values**: the [`FieldValue`] union crossing the audit boundary
//! - **Exact decimals**: [`Decimal`] fixed-point values with a controlled
//!   float conversion path
//! - **Entity identity**: [`EntityId`] and [`EntityDescriptor`]
//! - **Schema descriptors**: [`EntitySchema`] and [`FieldType`], resolved
//!   once at registration time

pub mod decimal;
pub mod id;
pub mod schema;
pub mod value;

pub use decimal::{Decimal, DecimalError};
pub use id::{EntityDescriptor, EntityId};
pub use schema::{EntitySchema, FieldType};
pub use value::FieldValue;
