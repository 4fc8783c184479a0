//! Integration tests module for the calculation history store
//!
//! Shared helpers for building stores over in-memory backends with a
//! controllable clock.

pub mod file_backend_test;
pub mod import_export_test;

use calc_history::backend::MemoryBackend;
use calc_history::clock::ManualClock;
use calc_history::config::HistoryConfig;
use calc_history::history::{HistoryStore, Payload};
use std::sync::Once;

static INIT: Once = Once::new();

/// 2023-11-14T22:13:20Z
pub const T0: i64 = 1_700_000_000_000;

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// A store over a fresh in-memory backend whose clock moves one second per save.
pub fn memory_store(max_records: usize) -> HistoryStore<MemoryBackend, ManualClock> {
    init_test_env();
    HistoryStore::with_clock(
        MemoryBackend::new(),
        HistoryConfig::new("calculation_history", max_records),
        ManualClock::ticking(T0, 1_000),
    )
    .expect("valid test config")
}

/// Builds a payload from a `json!` object literal.
pub fn payload(value: serde_json::Value) -> Payload {
    value
        .as_object()
        .cloned()
        .expect("payload must be a JSON object")
}
