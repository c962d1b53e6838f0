use chrono::{DateTime, Utc};
use fieldtrail_core::{AuditLog, AuditRegistration, FieldMap, MemoryStore};
use fieldtrail_core_types::{EntitySchema, FieldValue};

/// Entity kind used across the scenario tests
#[allow(dead_code)]
pub const COURIER_KIND: &str = "fleet.Courier";

/// Schema for the courier test entity
///
/// `vehicle` is deliberately left out of the logged set so tests can cover
/// edits to an unlogged field.
#[allow(dead_code)]
pub fn courier_schema() -> EntitySchema {
    use fieldtrail_core_types::FieldType;

    EntitySchema::new(COURIER_KIND)
        .with_field("name", FieldType::Text)
        .with_field("region", FieldType::Text)
        .with_field("deliveries", FieldType::Integer)
        .with_field("last_run", FieldType::DateTime)
        .with_field("vehicle", FieldType::Integer)
        .with_field("is_active", FieldType::Boolean)
        .with_field(
            "fastest_route",
            FieldType::Decimal {
                max_digits: 5,
                decimal_places: 2,
            },
        )
}

/// Register the courier kind over a fresh in-memory store
#[allow(dead_code)]
pub fn courier_log() -> AuditLog<MemoryStore> {
    let registration = AuditRegistration::register(
        courier_schema(),
        [
            "name",
            "region",
            "deliveries",
            "last_run",
            "is_active",
            "fastest_route",
        ],
    )
    .unwrap();
    AuditLog::new(registration, MemoryStore::new())
}

/// Field snapshot for one courier, logged fields only
#[allow(dead_code)]
pub fn courier_fields(
    name: &str,
    region: &str,
    deliveries: i64,
    last_run: DateTime<Utc>,
    is_active: bool,
    fastest_route: &str,
) -> FieldMap {
    FieldMap::from([
        ("name".to_string(), FieldValue::Text(name.to_string())),
        ("region".to_string(), FieldValue::Text(region.to_string())),
        ("deliveries".to_string(), FieldValue::Int(deliveries)),
        ("last_run".to_string(), FieldValue::DateTime(last_run)),
        ("is_active".to_string(), FieldValue::Bool(is_active)),
        (
            "fastest_route".to_string(),
            FieldValue::Decimal(fastest_route.parse().unwrap()),
        ),
    ])
}

/// A fixed timestamp for deterministic fixtures
#[allow(dead_code)]
pub fn run_stamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-04T07:18:00Z")
        .unwrap()
        .with_timezone(&Utc)
}
