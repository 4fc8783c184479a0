//! Calculation history for HR tools
//!
//! This crate keeps a local history of the calculations an HR user runs
//! (GOSI contributions, end-of-service benefits, leave balances, Saudization
//! ratios, compliance checks) and lets them retrieve, search, export and
//! re-import it.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - **backend**: Key-value persistence seam (in-memory, file system, shared)
//! - **config**: Store settings, defaults and loading from a settings document
//! - **clock**: Time sources for timestamps and statistics windows
//! - **models**: Typed inputs and outputs for each calculation type
//! - **history**: The store itself, plus its codec, search, statistics and
//!   display formatting
//!
//! # Persistence model
//!
//! The whole collection is one JSON array under a single backend key. Every
//! operation reads it, works in memory, and writes the full result back:
//!
//! 1. Reads never fail: missing or corrupt data is an empty history
//! 2. Records come back newest first
//! 3. The collection never holds more than `max_records` entries
//! 4. Ids are unique; imports never overwrite an existing id
//!
//! # Usage
//!
//! ```
//! use calc_history::backend::MemoryBackend;
//! use calc_history::config::HistoryConfig;
//! use calc_history::history::{CalculationType, HistoryStore};
//! use calc_history::models::{Calculation, GosiInputs, GosiOutputs};
//!
//! let mut store = HistoryStore::new(MemoryBackend::new(), HistoryConfig::default())?;
//!
//! let record = store.save_calculation(
//!     Calculation::Gosi {
//!         inputs: GosiInputs {
//!             basic_salary: 10000.0,
//!             housing_allowance: 2500.0,
//!             is_non_saudi: false,
//!             employer_contribution_rate: 0.1175,
//!             employee_contribution_rate: 0.0975,
//!         },
//!         outputs: GosiOutputs {
//!             employee_contribution: 1218.75,
//!             employer_contribution: 1468.75,
//!             total_contribution: 2687.5,
//!             total_insurable_salary: 12500.0,
//!         },
//!     },
//!     None,
//! )?;
//!
//! assert_eq!(store.get_by_type(CalculationType::Gosi), vec![record]);
//! # Ok::<(), calc_history::history::HistoryError>(())
//! ```

pub mod backend;
pub mod clock;
pub mod config;
pub mod history;
pub mod models;

pub use backend::{BackendError, BackendWrite, FileBackend, KeyValueBackend, MemoryBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::HistoryConfig;
pub use history::{CalculationRecord, CalculationType, HistoryError, HistoryStats, HistoryStore};
pub use models::Calculation;
