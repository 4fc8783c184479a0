//! Typed calculation payloads.
//!
//! The store persists inputs and outputs as opaque maps. This module gives
//! each calculation type its typed shape and converts between the two with
//! an exhaustive match on the type tag.

use crate::history::error::{HistoryError, Result};
use crate::history::models::{CalculationType, Payload};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inputs to a GOSI contribution calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GosiInputs {
    pub basic_salary: f64,
    pub housing_allowance: f64,
    pub is_non_saudi: bool,
    /// Employer share as a fraction (e.g. `0.1175`)
    pub employer_contribution_rate: f64,
    /// Employee share as a fraction (e.g. `0.0975`)
    pub employee_contribution_rate: f64,
}

/// Results of a GOSI contribution calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GosiOutputs {
    pub employee_contribution: f64,
    pub employer_contribution: f64,
    pub total_contribution: f64,
    pub total_insurable_salary: f64,
}

/// Inputs to an end-of-service benefit calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EosbInputs {
    pub basic_salary: f64,
    pub allowances: f64,
    pub years_of_service: f64,
    /// e.g. `"resignation"`, `"termination"`, `"contract_end"`
    pub termination_reason: String,
    /// e.g. `"limited"`, `"unlimited"`
    pub contract_type: String,
}

/// Inputs to a leave accrual calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveInputs {
    pub years_of_service: f64,
    pub used_days: f64,
    pub carry_over_days: f64,
    pub daily_salary: f64,
}

/// Inputs to a Saudization ratio calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaudizationInputs {
    pub total_employees: u32,
    pub saudi_employees: u32,
    pub sector: String,
}

/// Inputs to a compliance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceInputs {
    pub check_type: String,
    #[serde(default)]
    pub parameters: Payload,
}

/// A calculation with its typed inputs and outputs.
///
/// Only GOSI results have a fixed output shape; the other types keep their
/// outputs as a free-form payload owned by the calculator that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum Calculation {
    Gosi {
        inputs: GosiInputs,
        outputs: GosiOutputs,
    },
    Eosb {
        inputs: EosbInputs,
        outputs: Payload,
    },
    Leave {
        inputs: LeaveInputs,
        outputs: Payload,
    },
    Saudization {
        inputs: SaudizationInputs,
        outputs: Payload,
    },
    Compliance {
        inputs: ComplianceInputs,
        outputs: Payload,
    },
}

impl Calculation {
    /// The type tag this calculation is stored under.
    pub fn calculation_type(&self) -> CalculationType {
        match self {
            Calculation::Gosi { .. } => CalculationType::Gosi,
            Calculation::Eosb { .. } => CalculationType::Eosb,
            Calculation::Leave { .. } => CalculationType::Leave,
            Calculation::Saudization { .. } => CalculationType::Saudization,
            Calculation::Compliance { .. } => CalculationType::Compliance,
        }
    }

    /// Splits the calculation into its tag and opaque payloads.
    pub fn into_payloads(self) -> Result<(CalculationType, Payload, Payload)> {
        let calculation_type = self.calculation_type();
        let (inputs, outputs) = match self {
            Calculation::Gosi { inputs, outputs } => (to_payload(&inputs)?, to_payload(&outputs)?),
            Calculation::Eosb { inputs, outputs } => (to_payload(&inputs)?, outputs),
            Calculation::Leave { inputs, outputs } => (to_payload(&inputs)?, outputs),
            Calculation::Saudization { inputs, outputs } => (to_payload(&inputs)?, outputs),
            Calculation::Compliance { inputs, outputs } => (to_payload(&inputs)?, outputs),
        };
        Ok((calculation_type, inputs, outputs))
    }

    /// Rebuilds a typed calculation from a stored tag and payloads.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::PayloadShape` if a payload lacks a required
    /// field or holds a value of the wrong type. Extra fields are ignored.
    pub fn from_payloads(
        calculation_type: CalculationType,
        inputs: &Payload,
        outputs: &Payload,
    ) -> Result<Self> {
        let calculation = match calculation_type {
            CalculationType::Gosi => Calculation::Gosi {
                inputs: from_payload(calculation_type, inputs)?,
                outputs: from_payload(calculation_type, outputs)?,
            },
            CalculationType::Eosb => Calculation::Eosb {
                inputs: from_payload(calculation_type, inputs)?,
                outputs: outputs.clone(),
            },
            CalculationType::Leave => Calculation::Leave {
                inputs: from_payload(calculation_type, inputs)?,
                outputs: outputs.clone(),
            },
            CalculationType::Saudization => Calculation::Saudization {
                inputs: from_payload(calculation_type, inputs)?,
                outputs: outputs.clone(),
            },
            CalculationType::Compliance => Calculation::Compliance {
                inputs: from_payload(calculation_type, inputs)?,
                outputs: outputs.clone(),
            },
        };
        Ok(calculation)
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<Payload> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(HistoryError::Serialization(serde::ser::Error::custom(
            format!("expected a JSON object payload, got {}", other),
        ))),
    }
}

fn from_payload<T: DeserializeOwned>(
    calculation_type: CalculationType,
    payload: &Payload,
) -> Result<T> {
    serde_json::from_value(Value::Object(payload.clone())).map_err(|e| {
        HistoryError::PayloadShape {
            calculation_type,
            reason: e.to_string(),
        }
    })
}
