//! JSON encoding of the record collection.
//!
//! The whole collection lives in one JSON array. Stored data is decoded
//! leniently: an element that is not a valid record is skipped with a warning
//! so one bad entry does not wipe the history. Imported data is decoded
//! strictly: any invalid element rejects the whole payload.

use super::error::{HistoryError, Result};
use super::models::{validate_record, CalculationRecord};
use serde_json::Value;

/// Encodes records compactly for the backend.
pub fn encode_records(records: &[CalculationRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// Encodes records as pretty-printed JSON for export.
pub fn encode_records_pretty(records: &[CalculationRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Decodes the collection read from the backend under `key`.
///
/// # Errors
///
/// Returns `HistoryError::StorageRead` if the text is not JSON or its top
/// level is not an array. Invalid elements are logged and skipped.
pub fn decode_stored(key: &str, text: &str) -> Result<Vec<CalculationRecord>> {
    let value: Value = serde_json::from_str(text).map_err(|e| HistoryError::StorageRead {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(HistoryError::StorageRead {
                key: key.to_string(),
                reason: format!("expected a JSON array, found {}", json_kind(&other)),
            })
        }
    };

    let total = elements.len();
    let mut records = Vec::with_capacity(total);
    let mut corrupted = 0;

    for (index, element) in elements.into_iter().enumerate() {
        match decode_element(element) {
            Ok(record) => records.push(record),
            Err(reason) => {
                corrupted += 1;
                log::warn!(
                    "Skipping corrupted history record {} in '{}': {}",
                    index,
                    key,
                    reason
                );
            }
        }
    }

    if corrupted > 0 && corrupted > records.len() {
        log::warn!(
            "History '{}' has significant corruption ({} corrupted records, {} valid records)",
            key,
            corrupted,
            records.len()
        );
    }

    Ok(records)
}

/// Decodes an import payload.
///
/// # Errors
///
/// Returns `HistoryError::ImportFormat` if the text is not JSON, its top level
/// is not an array, or any element is not a record. Nothing is returned
/// partially.
pub fn decode_import(text: &str) -> Result<Vec<CalculationRecord>> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| HistoryError::ImportFormat(format!("malformed JSON: {}", e)))?;

    let elements = match value {
        Value::Array(elements) => elements,
        other => {
            return Err(HistoryError::ImportFormat(format!(
                "expected a JSON array of records, found {}",
                json_kind(&other)
            )))
        }
    };

    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            decode_element(element).map_err(|reason| {
                HistoryError::ImportFormat(format!("record {} is invalid: {}", index, reason))
            })
        })
        .collect()
}

/// Decodes and validates one array element, returning the reason on failure.
fn decode_element(element: Value) -> std::result::Result<CalculationRecord, String> {
    let record: CalculationRecord =
        serde_json::from_value(element).map_err(|e| e.to_string())?;
    validate_record(&record)?;
    Ok(record)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
