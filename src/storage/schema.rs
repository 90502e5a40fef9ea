//! Database schema definitions
//!
//! This module contains the SQL schema for the Tube-Harvest record table.

/// Name of the only table the harvester writes
pub const RECORDS_TABLE: &str = "videos_with_subtitles";

/// Record columns in table order, without the id
pub const RECORD_COLUMNS: &str = "title, author, description, views, publish_date, subtitles";

/// SQL schema for the database
pub fn schema_sql() -> String {
    format!(
        r#"
-- Completed videos, one row per successfully processed video
CREATE TABLE IF NOT EXISTS {RECORDS_TABLE} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT,
    author TEXT,
    description TEXT,
    views INTEGER,
    publish_date DATE,
    subtitles TEXT
);
"#
    )
}

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&schema_sql())?;
    Ok(())
}
