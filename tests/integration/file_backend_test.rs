//! History persisted to a directory on disk

use super::{init_test_env, payload, T0};
use calc_history::backend::FileBackend;
use calc_history::clock::ManualClock;
use calc_history::config::HistoryConfig;
use calc_history::history::{CalculationType, HistoryStore, Payload, RecordMetadata};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn open_store(dir: &Path, start: i64) -> HistoryStore<FileBackend, ManualClock> {
    init_test_env();
    HistoryStore::with_clock(
        FileBackend::open(dir).unwrap(),
        HistoryConfig::new("calculation_history", 50),
        ManualClock::ticking(start, 1_000),
    )
    .unwrap()
}

#[test]
fn test_history_survives_reopening() {
    let temp_dir = TempDir::new().unwrap();

    let saved = {
        let mut store = open_store(temp_dir.path(), T0);
        store
            .save(
                CalculationType::Eosb,
                payload(json!({ "basicSalary": 12000, "yearsOfService": 11 })),
                payload(json!({ "totalBenefit": 96000 })),
                Some(RecordMetadata::for_employee("Turki").with_employee_id("E-311")),
            )
            .unwrap()
    };

    let mut reopened = open_store(temp_dir.path(), T0 + 60_000);
    assert_eq!(reopened.get_all(), vec![saved.clone()]);

    reopened
        .save(CalculationType::Gosi, Payload::new(), Payload::new(), None)
        .unwrap();
    let all = reopened.get_all();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1], saved);
}

#[test]
fn test_collection_is_one_file_per_key() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(temp_dir.path(), T0);
    store
        .save(CalculationType::Leave, Payload::new(), Payload::new(), None)
        .unwrap();

    let path = temp_dir.path().join("calculation_history.json");
    let contents = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);

    // No temporary file is left behind after the rename
    let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_clear_deletes_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(temp_dir.path(), T0);
    store
        .save(CalculationType::Compliance, Payload::new(), Payload::new(), None)
        .unwrap();

    store.clear().unwrap();
    assert!(!temp_dir.path().join("calculation_history.json").exists());
    assert!(store.get_all().is_empty());

    // Clearing an already empty history is fine
    store.clear().unwrap();
}

#[test]
fn test_hand_edited_file_is_tolerated() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("calculation_history.json"),
        r#"[{"id": "calc_5_manual", "type": "saudization", "timestamp": 5, "inputs": {}, "outputs": {}}, 17]"#,
    )
    .unwrap();

    let store = open_store(temp_dir.path(), T0);
    let all = store.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].calculation_type(), CalculationType::Saudization);
}

#[test]
fn test_export_from_disk_imports_into_new_directory() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();

    let mut source = open_store(source_dir.path(), T0);
    for calculation_type in CalculationType::ALL {
        source
            .save(calculation_type, Payload::new(), Payload::new(), None)
            .unwrap();
    }
    let backup = source.export_json(None).unwrap();

    let mut target = open_store(target_dir.path(), T0);
    assert_eq!(target.import_json(&backup).unwrap(), 5);

    let reopened = open_store(target_dir.path(), T0);
    assert_eq!(reopened.get_all(), source.get_all());
}
