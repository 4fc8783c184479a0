//! Data models for calculation history.
//!
//! This module defines the persisted record shape: a type tag, creation
//! timestamp, opaque input/output payloads, and optional employee metadata.

use super::error::Result;
use crate::models::Calculation;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque key-value payload holding a calculation's inputs or outputs.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Prefix of every generated record id.
pub const RECORD_ID_PREFIX: &str = "calc";

/// Length of the random suffix in generated record ids.
const ID_SUFFIX_LEN: usize = 9;

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Kind of calculation a record holds.
///
/// Serialized as the lowercase tag (`"gosi"`, `"eosb"`, ...). Variant order is
/// the order used for per-type statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationType {
    /// Social-insurance contribution (GOSI)
    Gosi,
    /// End-of-service benefit (EOSB)
    Eosb,
    /// Leave accrual and balance
    Leave,
    /// Saudization ratio
    Saudization,
    /// Labor-law compliance check
    Compliance,
}

impl CalculationType {
    /// Every calculation type, in statistics order.
    pub const ALL: [CalculationType; 5] = [
        CalculationType::Gosi,
        CalculationType::Eosb,
        CalculationType::Leave,
        CalculationType::Saudization,
        CalculationType::Compliance,
    ];

    /// The serialized tag of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationType::Gosi => "gosi",
            CalculationType::Eosb => "eosb",
            CalculationType::Leave => "leave",
            CalculationType::Saudization => "saudization",
            CalculationType::Compliance => "compliance",
        }
    }

    /// Human-readable name for list displays.
    pub fn display_name(&self) -> &'static str {
        match self {
            CalculationType::Gosi => "GOSI Contribution",
            CalculationType::Eosb => "End of Service Benefit",
            CalculationType::Leave => "Leave Balance",
            CalculationType::Saudization => "Saudization Ratio",
            CalculationType::Compliance => "Compliance Check",
        }
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CalculationType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown calculation type: {}", s))
    }
}

/// Free-form details attached to a record; every field is searchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetadata {
    /// Name of the employee the calculation was run for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,

    /// Employer-assigned employee identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,

    /// Department or cost center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// User notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RecordMetadata {
    /// Metadata naming an employee.
    pub fn for_employee(name: impl Into<String>) -> Self {
        Self {
            employee_name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_employee_id(mut self, id: impl Into<String>) -> Self {
        self.employee_id = Some(id.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// The populated searchable fields, in a fixed order.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [
            &self.employee_name,
            &self.employee_id,
            &self.department,
            &self.notes,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
    }
}

/// A single stored calculation.
///
/// Records are created by the store's save operations, which assign the id
/// and timestamp; afterwards they are read-only. Unknown fields in persisted
/// or imported JSON are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    id: String,

    #[serde(rename = "type")]
    calculation_type: CalculationType,

    /// Creation time in epoch milliseconds.
    timestamp: i64,

    inputs: Payload,

    outputs: Payload,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<RecordMetadata>,
}

impl CalculationRecord {
    pub(crate) fn new(
        id: String,
        calculation_type: CalculationType,
        timestamp: i64,
        inputs: Payload,
        outputs: Payload,
        metadata: Option<RecordMetadata>,
    ) -> Self {
        Self {
            id,
            calculation_type,
            timestamp,
            inputs,
            outputs,
            metadata,
        }
    }

    /// Unique identifier, `calc_<timestamp>_<suffix>` for generated records.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn calculation_type(&self) -> CalculationType {
        self.calculation_type
    }

    /// Creation time in epoch milliseconds.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn inputs(&self) -> &Payload {
        &self.inputs
    }

    pub fn outputs(&self) -> &Payload {
        &self.outputs
    }

    pub fn metadata(&self) -> Option<&RecordMetadata> {
        self.metadata.as_ref()
    }

    /// Creation time as a UTC date-time.
    ///
    /// Timestamps outside chrono's range fall back to the Unix epoch.
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Decodes the payloads into the typed calculation for this record's type.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::PayloadShape` if the inputs or outputs do not
    /// match the shape of the record's calculation type.
    pub fn calculation(&self) -> Result<Calculation> {
        Calculation::from_payloads(self.calculation_type, &self.inputs, &self.outputs)
    }
}

/// Generates a record id of the form `calc_<timestamp>_<suffix>`.
///
/// The suffix is nine random lowercase base-36 characters.
pub fn generate_record_id(timestamp: i64) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}_{}_{}", RECORD_ID_PREFIX, timestamp, suffix)
}

/// Checks the fields serde cannot: a record id must be non-blank.
///
/// Returns the reason as a message; callers wrap it in the error kind that
/// fits where the record came from.
pub(crate) fn validate_record(record: &CalculationRecord) -> std::result::Result<(), String> {
    if record.id.trim().is_empty() {
        return Err(format!(
            "{} record at {} has an empty id",
            record.calculation_type, record.timestamp
        ));
    }
    Ok(())
}
