//! Aggregate statistics over the record collection.

use super::models::{CalculationRecord, CalculationType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One week in milliseconds.
pub const ONE_WEEK_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Thirty days in milliseconds.
pub const THIRTY_DAYS_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Summary counts over the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total: usize,
    /// Count per calculation type; every type is present, zero if unused.
    pub by_type: BTreeMap<CalculationType, usize>,
    /// Records created in the last 7 days.
    pub last_week: usize,
    /// Records created in the last 30 days.
    pub last_month: usize,
    /// Timestamp of the oldest record, if any.
    pub oldest_record: Option<i64>,
    /// Timestamp of the newest record, if any.
    pub newest_record: Option<i64>,
}

impl HistoryStats {
    /// Count for a single type.
    pub fn count_for(&self, calculation_type: CalculationType) -> usize {
        self.by_type.get(&calculation_type).copied().unwrap_or(0)
    }
}

/// Computes statistics for `records` relative to `now` (epoch milliseconds).
///
/// `records` must already be sorted newest first; the oldest and newest
/// timestamps are taken from its ends.
pub fn compute_stats(records: &[CalculationRecord], now: i64) -> HistoryStats {
    let mut by_type: BTreeMap<CalculationType, usize> =
        CalculationType::ALL.into_iter().map(|t| (t, 0)).collect();
    for record in records {
        *by_type.entry(record.calculation_type()).or_insert(0) += 1;
    }

    let week_start = now - ONE_WEEK_MS;
    let month_start = now - THIRTY_DAYS_MS;

    HistoryStats {
        total: records.len(),
        by_type,
        last_week: records.iter().filter(|r| r.timestamp() >= week_start).count(),
        last_month: records.iter().filter(|r| r.timestamp() >= month_start).count(),
        oldest_record: records.last().map(CalculationRecord::timestamp),
        newest_record: records.first().map(CalculationRecord::timestamp),
    }
}
