//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::storage::StoredRecord;
use crate::video::VideoRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable, append-only table of completed video records
///
/// Implementations must accept concurrent `append` calls from several
/// workers: each call is one atomic insert and never interleaves with
/// another.
pub trait RecordStore: Send + Sync {
    /// Appends a record and returns its auto-assigned, increasing id
    fn append(&self, record: &VideoRecord) -> StorageResult<i64>;

    // ===== Reads (statistics and tests only) =====

    /// Counts all stored records
    fn count_records(&self) -> StorageResult<u64>;

    /// Gets a record by id
    fn get_record(&self, id: i64) -> StorageResult<StoredRecord>;

    /// Gets the newest records, newest first
    fn recent_records(&self, limit: usize) -> StorageResult<Vec<StoredRecord>>;
}
