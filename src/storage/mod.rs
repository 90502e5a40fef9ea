//! Storage module for persisting harvested videos
//!
//! This module handles all database operations for the harvester:
//! - SQLite database initialization and schema management
//! - Atomic, serialized appends of completed video records
//! - Read helpers for statistics

mod schema;
mod sqlite;
mod traits;

pub use schema::RECORDS_TABLE;
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::video::VideoRecord;
use crate::HarvestError;
use std::path::Path;

/// Opens or creates the record store database
pub fn open_store(path: &Path) -> Result<SqliteStore, HarvestError> {
    SqliteStore::new(path)
}

/// A record as persisted, with its auto-assigned id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: i64,
    pub record: VideoRecord,
}
