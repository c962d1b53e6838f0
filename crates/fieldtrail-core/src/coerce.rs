//! Value coercion across the storage boundary
//!
//! The storage layer speaks a narrower type set than the application model:
//! it has no exact decimals and no date-only values. Outbound coercion
//! ([`storable`]) rewrites those before anything is written; inbound coercion
//! ([`to_declared`]) converts stored primitives back to each logged field's
//! declared type on the way out.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use fieldtrail_core_types::{Decimal, FieldType, FieldValue};

use crate::entry::FieldMap;
use crate::errors::{AuditError, Result};
use crate::registration::AuditRegistration;

/// Convert an application value into a storable primitive
///
/// Decimals become floats and date-only values become midnight timestamps;
/// everything else passes through. Lossy, and applied uniformly to every
/// staged field value and every extra-metadata value.
pub fn storable(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Decimal(d) => FieldValue::Float(d.to_f64()),
        FieldValue::Date(d) => FieldValue::DateTime(d.and_time(NaiveTime::MIN).and_utc()),
        other => other,
    }
}

/// Convert a stored primitive back to a field's declared type
///
/// Fields outside the logged set are opaque extras and pass through
/// unconverted. Null always passes through.
///
/// # Errors
///
/// `UnknownLoggedField` when a logged field has no declared type (cannot
/// happen through a valid [`AuditRegistration`]), `CoercionFailure` when the
/// stored value does not convert.
pub fn to_declared(
    registration: &AuditRegistration,
    field: &str,
    value: FieldValue,
) -> Result<FieldValue> {
    if !registration.is_logged(field) {
        return Ok(value);
    }

    let field_type = registration.schema().field_type(field).ok_or_else(|| {
        AuditError::UnknownLoggedField {
            kind: registration.kind().to_string(),
            field: field.to_string(),
        }
    })?;

    convert(field, field_type, value)
}

/// Apply [`to_declared`] to every field of a stored document
pub fn document_to_declared(registration: &AuditRegistration, fields: &FieldMap) -> Result<FieldMap> {
    fields
        .iter()
        .map(|(name, value)| {
            to_declared(registration, name, value.clone()).map(|v| (name.clone(), v))
        })
        .collect()
}

fn failure(field: &str, field_type: FieldType, value: &FieldValue) -> AuditError {
    AuditError::CoercionFailure {
        field: field.to_string(),
        reason: format!("{} value does not convert to {:?}", value.type_name(), field_type),
    }
}

/// Per-type conversion, liberal in what it accepts
///
/// The stored representation may predate a schema change or come from the
/// primitive-typed store, so each declared type accepts the obvious
/// alternates: integers for booleans, numeric strings for numbers, full
/// timestamps for dates. Decimal fields convert from floats only through the
/// fixed-point string rendering at the declared width and scale.
fn convert(field: &str, field_type: FieldType, value: FieldValue) -> Result<FieldValue> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }

    let converted = match (field_type, &value) {
        (FieldType::Boolean, FieldValue::Bool(_)) => Some(value.clone()),
        (FieldType::Boolean, FieldValue::Int(0)) => Some(FieldValue::Bool(false)),
        (FieldType::Boolean, FieldValue::Int(1)) => Some(FieldValue::Bool(true)),
        (FieldType::Boolean, FieldValue::Text(s)) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" => Some(FieldValue::Bool(true)),
            "false" | "0" => Some(FieldValue::Bool(false)),
            _ => None,
        },

        (FieldType::Integer, FieldValue::Int(_)) => Some(value.clone()),
        (FieldType::Integer, FieldValue::Float(f)) if f.fract() == 0.0 => {
            Some(FieldValue::Int(*f as i64))
        }
        (FieldType::Integer, FieldValue::Text(s)) => {
            s.trim().parse::<i64>().ok().map(FieldValue::Int)
        }

        (FieldType::Float, FieldValue::Float(_)) => Some(value.clone()),
        (FieldType::Float, FieldValue::Int(i)) => Some(FieldValue::Float(*i as f64)),
        (FieldType::Float, FieldValue::Text(s)) => {
            s.trim().parse::<f64>().ok().map(FieldValue::Float)
        }

        (FieldType::Decimal { .. }, FieldValue::Decimal(_)) => Some(value.clone()),
        (
            FieldType::Decimal {
                max_digits,
                decimal_places,
            },
            FieldValue::Float(f),
        ) => Decimal::from_f64_fixed(*f, max_digits, decimal_places)
            .ok()
            .map(FieldValue::Decimal),
        (FieldType::Decimal { .. }, FieldValue::Int(i)) => {
            Some(FieldValue::Decimal(Decimal::from_int(*i)))
        }
        (FieldType::Decimal { .. }, FieldValue::Text(s)) => {
            s.trim().parse::<Decimal>().ok().map(FieldValue::Decimal)
        }

        (FieldType::Date, FieldValue::Date(_)) => Some(value.clone()),
        (FieldType::Date, FieldValue::DateTime(dt)) => Some(FieldValue::Date(dt.date_naive())),
        (FieldType::Date, FieldValue::Text(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .map(FieldValue::Date),

        (FieldType::DateTime, FieldValue::DateTime(_)) => Some(value.clone()),
        (FieldType::DateTime, FieldValue::Date(d)) => {
            Some(FieldValue::DateTime(d.and_time(NaiveTime::MIN).and_utc()))
        }
        (FieldType::DateTime, FieldValue::Text(s)) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc))),

        (FieldType::Text, FieldValue::Text(_)) => Some(value.clone()),
        (FieldType::Text, FieldValue::Bool(b)) => Some(FieldValue::Text(b.to_string())),
        (FieldType::Text, FieldValue::Int(i)) => Some(FieldValue::Text(i.to_string())),
        (FieldType::Text, FieldValue::Float(f)) => Some(FieldValue::Text(f.to_string())),
        (FieldType::Text, FieldValue::Decimal(d)) => Some(FieldValue::Text(d.to_string())),
        (FieldType::Text, FieldValue::Date(d)) => Some(FieldValue::Text(d.to_string())),
        (FieldType::Text, FieldValue::DateTime(dt)) => {
            Some(FieldValue::Text(dt.to_rfc3339()))
        }

        _ => None,
    };

    converted.ok_or_else(|| failure(field, field_type, &value))
}
