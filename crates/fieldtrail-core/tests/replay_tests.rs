mod common;

use common::{courier_fields, courier_log, run_stamp};
use fieldtrail_core::{
    AuditError, AuditInfo, AuditLog, AuditRegistration, HistoryEntry, UnavailableStore,
};
use fieldtrail_core_types::FieldValue;

fn collect(log: &AuditLog<fieldtrail_core::MemoryStore>, id: i64) -> Vec<HistoryEntry> {
    log.replay(id)
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn test_creation_entry_reports_deltas_from_null() {
    let log = courier_log();
    let fields = courier_fields("Ada", "north", 29, run_stamp(), true, "77.90");
    log.record_create(1i64, &fields, AuditInfo::new());

    let history = collect(&log, 1);
    assert_eq!(history.len(), 1);

    let entry = &history[0];
    assert!(entry.direct.is_empty());
    assert_eq!(entry.changes.len(), fields.len());
    for (field, value) in &fields {
        let delta = &entry.changes[field];
        assert!(delta.from.is_null(), "field {field} should start from null");
        // Decimal values must come back exact, through the fixed-point path.
        assert_eq!(&delta.to, value, "field {field}");
    }
}

#[test]
fn test_update_chain_folds_previous_values_forward() {
    let log = courier_log();
    let v1 = courier_fields("Lee", "south", 28, run_stamp(), false, "71.10");
    log.record_create(2i64, &v1, AuditInfo::new());

    let mut v2 = v1.clone();
    v2.insert("deliveries".to_string(), FieldValue::Int(40));
    log.record_update(2i64, Some(&v1), &v2, AuditInfo::new());

    let mut v3 = v2.clone();
    v3.insert("deliveries".to_string(), FieldValue::Int(30));
    log.record_update(2i64, Some(&v2), &v3, AuditInfo::new());

    let history = collect(&log, 2);
    assert_eq!(history.len(), 3);

    let first_update = &history[1].changes["deliveries"];
    assert_eq!(first_update.from, FieldValue::Int(28));
    assert_eq!(first_update.to, FieldValue::Int(40));

    let second_update = &history[2].changes["deliveries"];
    assert_eq!(second_update.from, FieldValue::Int(40));
    assert_eq!(second_update.to, FieldValue::Int(30));

    // The untouched fields never reappear after the creation entry.
    assert_eq!(history[1].changes.len(), 1);
    assert_eq!(history[2].changes.len(), 1);
}

#[test]
fn test_replay_is_idempotent() {
    let log = courier_log();
    let v1 = courier_fields("Kara", "west", 27, run_stamp(), false, "46.77");
    log.record_create(3i64, &v1, AuditInfo::new());

    let mut v2 = v1.clone();
    v2.insert("region".to_string(), FieldValue::Text("east".into()));
    log.record_update(3i64, Some(&v1), &v2, AuditInfo::new());

    assert_eq!(collect(&log, 3), collect(&log, 3));
}

#[test]
fn test_replay_supports_partial_consumption() {
    let log = courier_log();
    let v1 = courier_fields("Kara", "west", 27, run_stamp(), false, "46.77");
    log.record_create(4i64, &v1, AuditInfo::new());

    let mut v2 = v1.clone();
    v2.insert("deliveries".to_string(), FieldValue::Int(28));
    log.record_update(4i64, Some(&v1), &v2, AuditInfo::new());

    let first = log.replay(4i64).unwrap().next().unwrap().unwrap();
    assert_eq!(first.changes["deliveries"].to, FieldValue::Int(27));
}

#[test]
fn test_extras_only_entry_has_empty_change_map() {
    let log = courier_log();
    let values = courier_fields("Kara", "west", 27, run_stamp(), false, "46.77");
    log.record_create(5i64, &values, AuditInfo::new());
    log.record_change(
        5i64,
        &values,
        &values,
        AuditInfo::new().with_extra("hair_colour", "blond"),
    );

    let history = collect(&log, 5);
    assert_eq!(history.len(), 2);

    let extras_entry = &history[1];
    assert!(extras_entry.changes.is_empty());
    assert_eq!(
        extras_entry.direct["hair_colour"],
        FieldValue::Text("blond".into())
    );
}

#[test]
fn test_decimal_history_round_trips_exactly() {
    let log = courier_log();
    let v1 = courier_fields("Ada", "north", 1, run_stamp(), true, "101.67");
    log.record_create(6i64, &v1, AuditInfo::new());

    let mut v2 = v1.clone();
    v2.insert(
        "fastest_route".to_string(),
        FieldValue::Decimal("99.98".parse().unwrap()),
    );
    log.record_update(6i64, Some(&v1), &v2, AuditInfo::new());

    let history = collect(&log, 6);
    let delta = &history[1].changes["fastest_route"];
    assert_eq!(delta.from, FieldValue::Decimal("101.67".parse().unwrap()));
    assert_eq!(delta.to, FieldValue::Decimal("99.98".parse().unwrap()));
}

#[test]
fn test_replay_propagates_store_failure() {
    let registration =
        AuditRegistration::register(common::courier_schema(), ["name"]).unwrap();
    let log = AuditLog::new(registration, UnavailableStore);

    let result = log.replay(1i64);
    assert!(matches!(result, Err(AuditError::StoreUnavailable { .. })));
}
