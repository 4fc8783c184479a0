//! Search functionality for calculation history.
//!
//! This module provides search and filtering over record slices. The store
//! applies these to the freshly read collection; they are also usable on any
//! subset a caller already holds.

use super::models::{CalculationRecord, CalculationType};

/// Searches records using case-insensitive substring matching.
///
/// Searches across:
/// - Employee name, employee id, department and notes (when present)
/// - The calculation type tag (`gosi`, `eosb`, ...)
///
/// An empty query is a substring of every type tag, so it matches every
/// record.
///
/// # Arguments
///
/// * `query` - The search term to match against
/// * `records` - The records to search through
///
/// # Returns
///
/// The matching records, in their original order.
///
/// # Example
///
/// ```
/// use calc_history::history::search_records;
///
/// let results = search_records("finance", &[]);
/// assert!(results.is_empty());
/// ```
pub fn search_records(query: &str, records: &[CalculationRecord]) -> Vec<CalculationRecord> {
    let query_lower = query.to_lowercase();

    records
        .iter()
        .filter(|record| matches_query(record, &query_lower))
        .cloned()
        .collect()
}

/// Checks if a record matches the given lowercase query in any searchable field.
fn matches_query(record: &CalculationRecord, query_lower: &str) -> bool {
    if record.calculation_type().as_str().contains(query_lower) {
        return true;
    }

    record.metadata().is_some_and(|metadata| {
        metadata
            .searchable_fields()
            .any(|field| field.to_lowercase().contains(query_lower))
    })
}

/// Filters records by calculation type.
pub fn filter_by_type(
    calculation_type: CalculationType,
    records: &[CalculationRecord],
) -> Vec<CalculationRecord> {
    records
        .iter()
        .filter(|record| record.calculation_type() == calculation_type)
        .cloned()
        .collect()
}

/// Filters records created within `[start, end]` (epoch milliseconds, both ends inclusive).
///
/// Returns nothing when `start > end`.
pub fn filter_by_date_range(
    start: i64,
    end: i64,
    records: &[CalculationRecord],
) -> Vec<CalculationRecord> {
    records
        .iter()
        .filter(|record| (start..=end).contains(&record.timestamp()))
        .cloned()
        .collect()
}

/// Filters records whose metadata carries exactly this employee id.
pub fn filter_by_employee_id(employee_id: &str, records: &[CalculationRecord]) -> Vec<CalculationRecord> {
    records
        .iter()
        .filter(|record| {
            record
                .metadata()
                .and_then(|metadata| metadata.employee_id.as_deref())
                == Some(employee_id)
        })
        .cloned()
        .collect()
}

/// Sorts records in place, newest first.
///
/// The sort is stable: records with equal timestamps keep their relative order.
pub fn sort_newest_first(records: &mut [CalculationRecord]) {
    records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
}

/// Returns the most recent `count` records.
pub fn get_recent_records(count: usize, records: &[CalculationRecord]) -> Vec<CalculationRecord> {
    let mut sorted = records.to_vec();
    sort_newest_first(&mut sorted);
    sorted.truncate(count);
    sorted
}
