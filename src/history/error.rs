//! Error types for history store operations.

use super::models::CalculationType;
use crate::backend::BackendError;
use thiserror::Error;

/// Result alias used throughout the history module.
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Errors that can occur during history operations.
///
/// A missing record is not an error: lookups return `None` and deletes
/// return `false`.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Persisted data could not be read or is not a record collection.
    ///
    /// Read operations recover from this by treating the history as empty.
    #[error("could not read history from '{key}': {reason}")]
    StorageRead {
        /// Backend key that was read
        key: String,
        /// What went wrong
        reason: String,
    },

    /// The backend rejected a write, after any degrade-and-retry attempt.
    #[error("could not save history to '{key}': {source}")]
    StorageWrite {
        /// Backend key that was written
        key: String,
        /// Error reported by the backend
        #[source]
        source: BackendError,
    },

    /// An import payload is not an array of record-shaped objects.
    #[error("invalid import format: {0}")]
    ImportFormat(String),

    /// Serializing records to JSON failed.
    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store configuration is invalid.
    #[error("invalid history configuration: {0}")]
    InvalidConfig(String),

    /// Another writer replaced the collection while this mutation ran.
    #[error("history at '{key}' was modified by another writer")]
    ConcurrentModification {
        /// Backend key that changed underneath the mutation
        key: String,
    },

    /// A record's payload does not match its calculation type.
    #[error("{calculation_type} payload has unexpected shape: {reason}")]
    PayloadShape {
        /// Type tag of the offending record
        calculation_type: CalculationType,
        /// Decoder message
        reason: String,
    },
}
