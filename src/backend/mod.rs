//! Key-value persistence backends.
//!
//! The history store never touches a storage medium directly. It reads and
//! writes whole string values through a [`KeyValueBackend`], so the same store
//! logic runs against an in-memory map in tests and a directory of files in
//! an application.
//!
//! # Backends
//!
//! - [`MemoryBackend`]: a `HashMap` with an optional byte quota
//! - [`FileBackend`]: one file per key inside a directory
//! - `Arc<Mutex<B>>`: any backend shared between several store instances
//!
//! [`KeyValueBackend::compare_and_swap`] is the one atomic primitive: a batch
//! of writes applied only while a check key still holds an expected value.
//! The shared implementation runs the whole batch under a single lock.

pub mod file;
pub mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors reported by a key-value backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The write would push the backend past its storage quota.
    #[error("storage quota exceeded: {requested} bytes requested, limit is {limit} bytes")]
    QuotaExceeded {
        /// Total bytes the backend would hold after the write
        requested: usize,
        /// Configured limit in bytes
        limit: usize,
    },

    /// The backend cannot be reached (e.g. a poisoned shared lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Underlying file I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One write inside a [`KeyValueBackend::compare_and_swap`] batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendWrite<'a> {
    Set { key: &'a str, value: &'a str },
    Remove { key: &'a str },
}

/// Synchronous string key-value storage.
///
/// Implementations make no concurrency promises beyond single-threaded
/// access; sharing across store instances goes through `Arc<Mutex<B>>`.
pub trait KeyValueBackend {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;

    /// Applies `writes` in order if `check_key` currently holds `expected`
    /// (`None` meaning absent).
    ///
    /// Returns `Ok(false)` without writing anything when the value differs.
    /// A failing write stops the batch; earlier writes stay applied.
    ///
    /// The default implementation relies on `&mut self` for exclusivity.
    /// Backends reachable from several handles must override it so the
    /// check and the writes happen under one critical section.
    fn compare_and_swap(
        &mut self,
        check_key: &str,
        expected: Option<&str>,
        writes: &[BackendWrite<'_>],
    ) -> Result<bool, BackendError> {
        if self.get(check_key)?.as_deref() != expected {
            return Ok(false);
        }

        for write in writes {
            match *write {
                BackendWrite::Set { key, value } => self.set(key, value)?,
                BackendWrite::Remove { key } => self.remove(key)?,
            }
        }
        Ok(true)
    }
}

impl<B: KeyValueBackend> KeyValueBackend for Arc<Mutex<B>> {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.lock()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?
            .get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        self.lock()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?
            .set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        self.lock()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?
            .remove(key)
    }

    fn compare_and_swap(
        &mut self,
        check_key: &str,
        expected: Option<&str>,
        writes: &[BackendWrite<'_>],
    ) -> Result<bool, BackendError> {
        self.lock()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?
            .compare_and_swap(check_key, expected, writes)
    }
}
