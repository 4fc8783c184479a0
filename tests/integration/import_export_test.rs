//! Backup and restore workflows
//!
//! Export produces the canonical pretty-printed backup; import merges a
//! backup into the current history without overwriting existing records.

use super::{memory_store, payload, T0};
use calc_history::backend::MemoryBackend;
use calc_history::clock::ManualClock;
use calc_history::history::format_history_grouped_by_date;
use calc_history::history::{
    CalculationType, HistoryError, HistoryStore, ImportSummary, Payload, RecordMetadata,
};
use serde_json::{json, Value};

fn seed(count: usize) -> HistoryStore<MemoryBackend, ManualClock> {
    let mut store = memory_store(100);
    for i in 0..count {
        store
            .save(
                CalculationType::ALL[i % 5],
                payload(json!({ "basicSalary": 5000 + i })),
                payload(json!({ "result": i })),
                Some(RecordMetadata::for_employee(format!("Employee {}", i))),
            )
            .unwrap();
    }
    store
}

#[test]
fn test_export_is_pretty_printed_schema() {
    let store = seed(2);

    let exported = store.export_json(None).unwrap();
    assert!(exported.contains('\n'));

    let value: Value = serde_json::from_str(&exported).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 2);
    for record in records {
        for field in ["id", "type", "timestamp", "inputs", "outputs", "metadata"] {
            assert!(record.get(field).is_some(), "missing {}", field);
        }
    }
    assert_eq!(records[0]["type"], "eosb");
    assert_eq!(records[1]["metadata"]["employeeName"], "Employee 0");
}

#[test]
fn test_export_subset() {
    let store = seed(4);
    let gosi_only = store.get_by_type(CalculationType::Gosi);

    let exported = store.export_json(Some(&gosi_only)).unwrap();
    let value: Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
    assert_eq!(value[0]["type"], "gosi");
}

#[test]
fn test_round_trip_into_same_store_adds_nothing() {
    let mut store = seed(6);
    let before = store.get_all();

    let exported = store.export_json(None).unwrap();
    let summary = store.import_json_with_summary(&exported).unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            added: 0,
            duplicates: 6,
            trimmed: 0
        }
    );
    assert_eq!(store.get_all(), before);
}

#[test]
fn test_round_trip_into_fresh_store_restores_everything() {
    let source = seed(6);
    let exported = source.export_json(None).unwrap();

    let mut target = memory_store(100);
    assert_eq!(target.import_json(&exported).unwrap(), 6);
    assert_eq!(target.get_all(), source.get_all());

    // A second import of the same backup is a no-op
    assert_eq!(target.import_json(&exported).unwrap(), 0);
    assert_eq!(target.get_all(), source.get_all());
}

#[test]
fn test_import_conflicting_id_keeps_existing_fields() {
    let mut store = memory_store(100);
    let existing = store
        .save(
            CalculationType::Gosi,
            payload(json!({ "basicSalary": 10000, "housingAllowance": 2500 })),
            Payload::new(),
            None,
        )
        .unwrap();

    let backup = json!([
        {
            "id": existing.id(),
            "type": "gosi",
            "timestamp": existing.timestamp(),
            "inputs": { "basicSalary": 20000, "housingAllowance": 2500 },
            "outputs": {}
        },
        {
            "id": "calc_1699990000000_newrecord",
            "type": "leave",
            "timestamp": 1_699_990_000_000i64,
            "inputs": { "usedDays": 4 },
            "outputs": {},
            "metadata": { "employeeName": "Ghada" }
        }
    ]);

    let added = store.import_json(&backup.to_string()).unwrap();
    assert_eq!(added, 1);

    let kept = store.get_by_id(existing.id()).unwrap();
    assert_eq!(kept.inputs()["basicSalary"], json!(10000));
    assert_eq!(store.get_all().len(), 2);
    assert_eq!(store.search("ghada").len(), 1);
}

#[test]
fn test_import_merges_and_resorts() {
    let mut store = memory_store(100);
    store
        .save(CalculationType::Gosi, Payload::new(), Payload::new(), None)
        .unwrap();

    let backup = json!([
        { "id": "calc_future", "type": "eosb", "timestamp": T0 + 86_400_000, "inputs": {}, "outputs": {} },
        { "id": "calc_past", "type": "leave", "timestamp": T0 - 86_400_000, "inputs": {}, "outputs": {} }
    ]);
    store.import_json(&backup.to_string()).unwrap();

    let ids: Vec<String> = store.get_all().iter().map(|r| r.id().to_string()).collect();
    assert_eq!(ids[0], "calc_future");
    assert_eq!(ids[2], "calc_past");
}

#[test]
fn test_import_trims_to_cap_oldest_loses() {
    let mut store = memory_store(3);
    for _ in 0..3 {
        store
            .save(CalculationType::Gosi, Payload::new(), Payload::new(), None)
            .unwrap();
    }

    let backup = json!([
        { "id": "calc_ancient", "type": "leave", "timestamp": 1, "inputs": {}, "outputs": {} },
        { "id": "calc_newest", "type": "leave", "timestamp": T0 + 10_000_000, "inputs": {}, "outputs": {} }
    ]);

    let summary = store.import_json_with_summary(&backup.to_string()).unwrap();
    assert_eq!(summary.added, 2);
    assert_eq!(summary.trimmed, 2);

    let all = store.get_all();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id(), "calc_newest");
    assert!(store.get_by_id("calc_ancient").is_none());
}

#[test]
fn test_import_format_errors() {
    let mut store = seed(1);

    for bad in [
        r#"{"records": []}"#,
        "42",
        "not json",
        r#"[{"id": "calc_1_x", "type": "payroll", "timestamp": 1, "inputs": {}, "outputs": {}}]"#,
        r#"[{"id": "calc_1_x", "type": "gosi", "timestamp": 1}]"#,
    ] {
        let err = store.import_json(bad).unwrap_err();
        assert!(matches!(err, HistoryError::ImportFormat(_)), "{}", bad);
    }

    assert_eq!(store.get_all().len(), 1);
}

#[test]
fn test_import_tolerates_unknown_fields() {
    let mut store = memory_store(100);
    let backup = json!([{
        "id": "calc_1_future_format",
        "type": "compliance",
        "timestamp": T0,
        "inputs": { "checkType": "nitaqat", "parameters": {} },
        "outputs": { "passed": true },
        "metadata": { "notes": "migrated", "approvedBy": "HR lead" },
        "schemaVersion": 3
    }]);

    assert_eq!(store.import_json(&backup.to_string()).unwrap(), 1);
    let record = store.get_by_id("calc_1_future_format").unwrap();
    assert_eq!(record.metadata().unwrap().notes.as_deref(), Some("migrated"));
}

#[test]
fn test_import_empty_array_adds_nothing() {
    let mut store = seed(2);
    assert_eq!(store.import_json("[]").unwrap(), 0);
    assert_eq!(store.get_all().len(), 2);
}

#[test]
fn test_imported_extreme_timestamp_can_be_displayed() {
    let mut store = memory_store(100);
    let backup = json!([
        { "id": "calc_x_1", "type": "gosi", "timestamp": i64::MIN, "inputs": {}, "outputs": {} },
        { "id": "calc_x_2", "type": "leave", "timestamp": i64::MAX, "inputs": {}, "outputs": {} }
    ]);
    assert_eq!(store.import_json(&backup.to_string()).unwrap(), 2);

    let listing = format_history_grouped_by_date(&store.get_all(), T0);
    assert!(listing.contains("years ago"));
    assert!(listing.contains("just now"));
}
