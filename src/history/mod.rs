//! Calculation history tracking and persistence.
//!
//! This module records every calculation a user runs and lets them review,
//! search, export and re-import that history.
//!
//! # Features
//!
//! - Save calculations with generated ids and timestamps
//! - Newest-first retrieval, filtering by type, date range or search query
//! - Automatic cap enforcement (oldest records dropped first)
//! - Degrade-and-retry when the backend rejects a write
//! - Pretty-printed JSON export and deduplicating import
//! - Per-type and recent-activity statistics
//!
//! # Example
//!
//! ```
//! use calc_history::backend::MemoryBackend;
//! use calc_history::config::HistoryConfig;
//! use calc_history::history::{CalculationType, HistoryStore, Payload, RecordMetadata};
//!
//! let mut store = HistoryStore::new(MemoryBackend::new(), HistoryConfig::default())?;
//! store.save(
//!     CalculationType::Saudization,
//!     Payload::new(),
//!     Payload::new(),
//!     Some(RecordMetadata::for_employee("Mona").with_department("Retail")),
//! )?;
//!
//! let backup = store.export_json(None)?;
//! assert_eq!(store.import_json(&backup)?, 0);
//! # Ok::<(), calc_history::history::HistoryError>(())
//! ```

pub mod codec;
pub mod error;
pub mod models;
pub mod search;
pub mod stats;
pub mod store;
pub mod ui;

// Re-export commonly used types
pub use error::{HistoryError, Result};
pub use models::{generate_record_id, CalculationRecord, CalculationType, Payload, RecordMetadata};
pub use search::{
    filter_by_date_range, filter_by_employee_id, filter_by_type, get_recent_records,
    search_records, sort_newest_first,
};
pub use stats::{compute_stats, HistoryStats, ONE_WEEK_MS, THIRTY_DAYS_MS};
pub use store::{HistoryStore, ImportSummary};
pub use ui::{
    format_history_details, format_history_entry, format_history_entry_relative,
    format_history_grouped_by_date, format_history_list, format_history_stats,
    format_relative_time,
};
