//! Configuration schema for the calculation history store.
//!
//! This module defines the settings a [`HistoryStore`](crate::history::HistoryStore)
//! is constructed with, together with their defaults and validation rules.

use serde::{Deserialize, Serialize};

/// Default backend key under which the record collection is persisted.
pub const DEFAULT_STORAGE_KEY: &str = "calculation_history";

/// Default maximum number of records retained in history.
pub const MAX_RECORDS: usize = 100;

/// Suffix appended to the storage key to form the revision-stamp key.
const REVISION_KEY_SUFFIX: &str = "::revision";

/// Settings for a history store instance.
///
/// Every field has a default, so a partial settings object (or none at all)
/// still deserializes into a usable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Backend key holding the serialized record collection.
    ///
    /// Defaults to `"calculation_history"`. Must not be blank.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Maximum number of records kept after any write.
    ///
    /// When a write would exceed this cap the oldest records are dropped
    /// first. Defaults to 100.
    ///
    /// Must be > 0.
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Whether mutations check the revision stamp before writing.
    ///
    /// When enabled, a mutation aborts with
    /// [`HistoryError::ConcurrentModification`](crate::history::HistoryError::ConcurrentModification)
    /// if another writer replaced the collection between this mutation's read
    /// and its write. Defaults to false (last writer wins).
    #[serde(default)]
    pub guard_concurrent_writes: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            max_records: default_max_records(),
            guard_concurrent_writes: false,
        }
    }
}

impl HistoryConfig {
    /// Creates a configuration with the given key and cap, guard disabled.
    pub fn new(storage_key: impl Into<String>, max_records: usize) -> Self {
        Self {
            storage_key: storage_key.into(),
            max_records,
            guard_concurrent_writes: false,
        }
    }

    /// Enables or disables the revision-stamp write guard.
    pub fn with_write_guard(mut self, enabled: bool) -> Self {
        self.guard_concurrent_writes = enabled;
        self
    }

    /// Validates the configuration and returns errors if any settings are invalid.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage_key.trim().is_empty() {
            return Err("storageKey must not be empty".to_string());
        }

        if self.max_records == 0 {
            return Err("maxRecords must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Number of records kept when a failed write is retried.
    ///
    /// Half the cap, but never fewer than one so the record being saved
    /// always survives the degraded retry.
    pub fn degraded_capacity(&self) -> usize {
        (self.max_records / 2).max(1)
    }

    /// Backend key holding the revision stamp of the collection.
    pub fn revision_key(&self) -> String {
        format!("{}{}", self.storage_key, REVISION_KEY_SUFFIX)
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_records() -> usize {
    MAX_RECORDS
}
