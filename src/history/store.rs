//! The calculation history store.
//!
//! Every operation reads the whole collection from the backend, works on it
//! in memory, and (for mutations) writes the whole collection back. There is
//! no partial update.
//!
//! # Concurrent writers
//!
//! A single store instance is consistent with itself. Two instances sharing
//! one backend key (two browser tabs, two handles on a shared backend) are
//! not: each mutation writes the collection it read, so when two mutations
//! interleave the later write replaces the earlier one and the earlier
//! change is lost. Enabling
//! [`HistoryConfig::guard_concurrent_writes`] on every instance turns that
//! silent loss into a [`HistoryError::ConcurrentModification`] error: the
//! revision stamp read before the collection is checked and replaced in the
//! same [`KeyValueBackend::compare_and_swap`] batch that writes the data.

use super::codec;
use super::error::{HistoryError, Result};
use super::models::{
    generate_record_id, CalculationRecord, CalculationType, Payload, RecordMetadata,
};
use super::search::{
    filter_by_date_range, filter_by_employee_id, filter_by_type, get_recent_records,
    search_records, sort_newest_first,
};
use super::stats::{compute_stats, HistoryStats};
use crate::backend::{BackendWrite, KeyValueBackend};
use crate::clock::{Clock, SystemClock};
use crate::config::HistoryConfig;
use crate::models::Calculation;
use std::collections::HashSet;

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Imported records whose id was new to the store.
    pub added: usize,
    /// Imported records discarded because their id already existed
    /// (in the store or earlier in the same payload).
    pub duplicates: usize,
    /// Records dropped from the merged collection to respect the cap.
    pub trimmed: usize,
}

/// Persistent history of calculations over a key-value backend.
///
/// # Example
///
/// ```
/// use calc_history::backend::MemoryBackend;
/// use calc_history::config::HistoryConfig;
/// use calc_history::history::{CalculationType, HistoryStore, Payload};
///
/// let mut store = HistoryStore::new(MemoryBackend::new(), HistoryConfig::default()).unwrap();
/// let record = store
///     .save(CalculationType::Leave, Payload::new(), Payload::new(), None)
///     .unwrap();
///
/// assert_eq!(store.get_by_id(record.id()), Some(record));
/// ```
#[derive(Debug)]
pub struct HistoryStore<B, C = SystemClock> {
    backend: B,
    config: HistoryConfig,
    clock: C,
}

impl<B: KeyValueBackend> HistoryStore<B, SystemClock> {
    /// Creates a store using the system clock.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidConfig` if `config` fails validation.
    pub fn new(backend: B, config: HistoryConfig) -> Result<Self> {
        Self::with_clock(backend, config, SystemClock)
    }
}

impl<B: KeyValueBackend, C: Clock> HistoryStore<B, C> {
    /// Creates a store that takes timestamps from `clock`.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidConfig` if `config` fails validation.
    pub fn with_clock(backend: B, config: HistoryConfig, clock: C) -> Result<Self> {
        config.validate().map_err(HistoryError::InvalidConfig)?;
        Ok(Self {
            backend,
            config,
            clock,
        })
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Records a new calculation and returns it with its generated id and timestamp.
    ///
    /// The record is placed at the front of the collection and the collection
    /// is cut to `max_records`. If the backend rejects the write, the
    /// collection is cut again to half the cap (the new record is always
    /// kept) and the write is retried once.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::StorageWrite` if the retry also fails, and
    /// `HistoryError::ConcurrentModification` if the write guard is enabled
    /// and another writer changed the collection meanwhile.
    pub fn save(
        &mut self,
        calculation_type: CalculationType,
        inputs: Payload,
        outputs: Payload,
        metadata: Option<RecordMetadata>,
    ) -> Result<CalculationRecord> {
        let revision = self.read_revision();
        let mut records = self.get_all();

        let timestamp = self.clock.now_millis();
        let id = unique_record_id(timestamp, &records);
        let record =
            CalculationRecord::new(id, calculation_type, timestamp, inputs, outputs, metadata);

        records.insert(0, record.clone());
        if records.len() > self.config.max_records {
            log::debug!(
                "History cap of {} reached, dropping {} oldest records",
                self.config.max_records,
                records.len() - self.config.max_records
            );
            records.truncate(self.config.max_records);
        }

        match self.write_records(&records, revision.as_deref()) {
            Ok(()) => {}
            Err(HistoryError::StorageWrite { source, .. }) => {
                let keep = self.config.degraded_capacity();
                log::warn!(
                    "Saving history failed ({}); retrying with the {} most recent records",
                    source,
                    keep
                );
                records.truncate(keep);
                self.write_records(&records, revision.as_deref())?;
            }
            Err(e) => return Err(e),
        }

        Ok(record)
    }

    /// Records a typed calculation. See [`save`](Self::save).
    pub fn save_calculation(
        &mut self,
        calculation: Calculation,
        metadata: Option<RecordMetadata>,
    ) -> Result<CalculationRecord> {
        let (calculation_type, inputs, outputs) = calculation.into_payloads()?;
        self.save(calculation_type, inputs, outputs, metadata)
    }

    /// Returns every record, newest first.
    ///
    /// Missing or unreadable storage yields an empty history; the failure is
    /// logged. Use [`try_get_all`](Self::try_get_all) to observe it.
    pub fn get_all(&self) -> Vec<CalculationRecord> {
        self.try_get_all().unwrap_or_else(|e| {
            log::warn!("Treating history as empty: {}", e);
            Vec::new()
        })
    }

    /// Returns every record, newest first, reporting unreadable storage.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::StorageRead` if the backend fails or the stored
    /// text is not a JSON array. A missing key is an empty history, not an error.
    pub fn try_get_all(&self) -> Result<Vec<CalculationRecord>> {
        let key = &self.config.storage_key;
        let stored = self
            .backend
            .get(key)
            .map_err(|e| HistoryError::StorageRead {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        let Some(text) = stored else {
            return Ok(Vec::new());
        };

        let mut records = codec::decode_stored(key, &text)?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Returns the records of one calculation type, newest first.
    pub fn get_by_type(&self, calculation_type: CalculationType) -> Vec<CalculationRecord> {
        filter_by_type(calculation_type, &self.get_all())
    }

    /// Looks up a record by id.
    pub fn get_by_id(&self, id: &str) -> Option<CalculationRecord> {
        self.get_all().into_iter().find(|record| record.id() == id)
    }

    /// Deletes the record with `id`.
    ///
    /// Returns `Ok(false)` without writing if no such record exists.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let removed = self.remove_where(|record| record.id() == id)?;
        Ok(removed > 0)
    }

    /// Deletes every record of `calculation_type` and returns how many were removed.
    pub fn delete_by_type(&mut self, calculation_type: CalculationType) -> Result<usize> {
        self.remove_where(|record| record.calculation_type() == calculation_type)
    }

    /// Removes the whole persisted collection.
    pub fn clear(&mut self) -> Result<()> {
        let revision = self.read_revision();
        self.commit(None, revision.as_deref())
    }

    /// Case-insensitive search over employee metadata and the type tag.
    pub fn search(&self, query: &str) -> Vec<CalculationRecord> {
        search_records(query, &self.get_all())
    }

    /// Returns the `count` most recent records.
    pub fn get_recent_records(&self, count: usize) -> Vec<CalculationRecord> {
        get_recent_records(count, &self.get_all())
    }

    /// Returns records created within `[start, end]` epoch milliseconds, inclusive.
    pub fn get_by_date_range(&self, start: i64, end: i64) -> Vec<CalculationRecord> {
        filter_by_date_range(start, end, &self.get_all())
    }

    /// Returns the records whose metadata carries exactly `employee_id`, newest first.
    pub fn get_by_employee_id(&self, employee_id: &str) -> Vec<CalculationRecord> {
        filter_by_employee_id(employee_id, &self.get_all())
    }

    /// Serializes `records`, or the whole history when `None`, as pretty-printed JSON.
    pub fn export_json(&self, records: Option<&[CalculationRecord]>) -> Result<String> {
        match records {
            Some(records) => codec::encode_records_pretty(records),
            None => codec::encode_records_pretty(&self.get_all()),
        }
    }

    /// Merges an exported JSON array into the history and returns how many
    /// records were added. See [`import_json_with_summary`](Self::import_json_with_summary).
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        Ok(self.import_json_with_summary(json)?.added)
    }

    /// Merges an exported JSON array into the history.
    ///
    /// Records whose id already exists are discarded: the stored version
    /// always wins. The merged collection is re-sorted newest first and cut
    /// to the cap, so new records older than the cap boundary are dropped.
    /// Nothing is written when no record is new.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::ImportFormat` before touching the backend if
    /// the payload is not an array of records.
    pub fn import_json_with_summary(&mut self, json: &str) -> Result<ImportSummary> {
        let imported = codec::decode_import(json)?;

        let revision = self.read_revision();
        let existing = self.get_all();
        let mut seen: HashSet<String> = existing.iter().map(|r| r.id().to_string()).collect();

        let mut summary = ImportSummary::default();
        let mut new_records = Vec::new();
        for record in imported {
            if seen.insert(record.id().to_string()) {
                new_records.push(record);
            } else {
                summary.duplicates += 1;
            }
        }
        summary.added = new_records.len();

        if new_records.is_empty() {
            log::debug!(
                "Import found nothing new ({} duplicates)",
                summary.duplicates
            );
            return Ok(summary);
        }

        let mut merged: Vec<CalculationRecord> = new_records.into_iter().chain(existing).collect();
        sort_newest_first(&mut merged);
        if merged.len() > self.config.max_records {
            summary.trimmed = merged.len() - self.config.max_records;
            merged.truncate(self.config.max_records);
        }

        self.write_records(&merged, revision.as_deref())?;

        log::debug!(
            "Imported {} records ({} duplicates, {} trimmed)",
            summary.added,
            summary.duplicates,
            summary.trimmed
        );
        Ok(summary)
    }

    /// Computes statistics against a single reading of the clock.
    pub fn get_history_stats(&self) -> HistoryStats {
        let records = self.get_all();
        let now = self.clock.now_millis();
        compute_stats(&records, now)
    }

    fn remove_where<F>(&mut self, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&CalculationRecord) -> bool,
    {
        let revision = self.read_revision();
        let mut records = self.get_all();

        let before = records.len();
        records.retain(|record| !predicate(record));
        let removed = before - records.len();
        if removed == 0 {
            return Ok(0);
        }

        self.write_records(&records, revision.as_deref())?;

        Ok(removed)
    }

    fn write_records(&mut self, records: &[CalculationRecord], revision: Option<&str>) -> Result<()> {
        let text = codec::encode_records(records)?;
        self.commit(Some(&text), revision)
    }

    /// Stores `value` under the storage key, or removes the key when `None`.
    ///
    /// With the guard enabled the write only happens if the revision stamp
    /// still equals `revision`, and a fresh stamp is stored in the same batch.
    fn commit(&mut self, value: Option<&str>, revision: Option<&str>) -> Result<()> {
        let key = &self.config.storage_key;
        let write = match value {
            Some(value) => BackendWrite::Set { key, value },
            None => BackendWrite::Remove { key },
        };
        let storage_error = |source| HistoryError::StorageWrite {
            key: key.clone(),
            source,
        };

        if !self.config.guard_concurrent_writes {
            let result = match write {
                BackendWrite::Set { key, value } => self.backend.set(key, value),
                BackendWrite::Remove { key } => self.backend.remove(key),
            };
            return result.map_err(storage_error);
        }

        let revision_key = self.config.revision_key();
        let next_revision = uuid::Uuid::new_v4().to_string();
        let writes = [
            write,
            BackendWrite::Set {
                key: &revision_key,
                value: &next_revision,
            },
        ];
        let swapped = self
            .backend
            .compare_and_swap(&revision_key, revision, &writes)
            .map_err(storage_error)?;
        if !swapped {
            return Err(HistoryError::ConcurrentModification { key: key.clone() });
        }
        Ok(())
    }

    /// Reads the revision stamp, or `None` when the guard is off or no stamp exists.
    fn read_revision(&self) -> Option<String> {
        if !self.config.guard_concurrent_writes {
            return None;
        }

        match self.backend.get(&self.config.revision_key()) {
            Ok(revision) => revision,
            Err(e) => {
                log::warn!("Could not read history revision: {}", e);
                None
            }
        }
    }
}

/// Generates an id for `timestamp` that no record in `records` uses.
fn unique_record_id(timestamp: i64, records: &[CalculationRecord]) -> String {
    loop {
        let id = generate_record_id(timestamp);
        if records.iter().all(|record| record.id() != id) {
            return id;
        }
    }
}
