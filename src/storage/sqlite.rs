//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::storage::schema::{initialize_schema, RECORDS_TABLE, RECORD_COLUMNS};
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::StoredRecord;
use crate::video::VideoRecord;
use crate::HarvestError;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// How long a writer waits on a lock held by another connection
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn select_records() -> String {
    format!("SELECT id, {RECORD_COLUMNS} FROM {RECORDS_TABLE}")
}

/// SQLite record store
///
/// The connection is guarded by a mutex so appends from concurrent workers
/// are serialized; each append is a single INSERT.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl RecordStore for SqliteStore {
    fn append(&self, record: &VideoRecord) -> StorageResult<i64> {
        let conn = self.lock()?;
        let publish_date = record
            .publish_date
            .map(|date| date.format(DATE_FORMAT).to_string());

        conn.execute(
            &format!(
                "INSERT INTO {RECORDS_TABLE} ({RECORD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ),
            params![
                record.title,
                record.author,
                record.description,
                record.views,
                publish_date,
                record.subtitles
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn count_records(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {RECORDS_TABLE}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn get_record(&self, id: i64) -> StorageResult<StoredRecord> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!("{} WHERE id = ?1", select_records()),
                params![id],
                RawRow::from_row,
            )
            .optional()?
            .ok_or(StorageError::RecordNotFound(id))?;

        raw.into_stored()
    }

    fn recent_records(&self, limit: usize) -> StorageResult<Vec<StoredRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id DESC LIMIT ?1", select_records()))?;

        let rows = stmt.query_map(params![limit as i64], RawRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_stored()?);
        }

        Ok(records)
    }
}

/// Row as read from SQLite, before date parsing
struct RawRow {
    id: i64,
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    views: Option<i64>,
    publish_date: Option<String>,
    subtitles: Option<String>,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            description: row.get(3)?,
            views: row.get(4)?,
            publish_date: row.get(5)?,
            subtitles: row.get(6)?,
        })
    }

    fn into_stored(self) -> StorageResult<StoredRecord> {
        let publish_date = self
            .publish_date
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                    .map_err(|e| StorageError::InvalidValue(format!("publish_date '{}': {}", raw, e)))
            })
            .transpose()?;

        Ok(StoredRecord {
            id: self.id,
            record: VideoRecord {
                title: self.title.unwrap_or_default(),
                author: self.author.unwrap_or_default(),
                description: self.description.unwrap_or_default(),
                views: self.views.unwrap_or_default(),
                publish_date,
                subtitles: self.subtitles.unwrap_or_default(),
            },
        })
    }
}
