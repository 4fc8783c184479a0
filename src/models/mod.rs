//! Typed models for the calculations recorded in history.
//!
//! Records store inputs and outputs as opaque maps; the types here describe
//! what each calculation type actually carries.

pub mod calculation;

pub use calculation::{
    Calculation, ComplianceInputs, EosbInputs, GosiInputs, GosiOutputs, LeaveInputs,
    SaudizationInputs,
};
