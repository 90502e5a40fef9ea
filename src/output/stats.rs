//! Statistics generation from the record store
//!
//! This module provides functionality for extracting and displaying
//! a summary of harvested videos.

use crate::storage::{RecordStore, StorageResult, StoredRecord};

/// Number of most recent records shown by `--stats`
pub const RECENT_LIMIT: usize = 10;

/// Longest title printed before truncation
const TITLE_WIDTH: usize = 60;

/// Summary of one stored record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub views: i64,
    /// ISO date, or `-` when unknown
    pub published: String,
    /// Number of transcript lines
    pub subtitle_lines: usize,
}

impl From<&StoredRecord> for RecentRecord {
    fn from(stored: &StoredRecord) -> Self {
        let record = &stored.record;
        Self {
            id: stored.id,
            title: record.title.clone(),
            author: record.author.clone(),
            views: record.views,
            published: record
                .publish_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            subtitle_lines: record.subtitles.lines().count(),
        }
    }
}

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of stored records
    pub total_records: u64,

    /// Newest records, newest first
    pub recent: Vec<RecentRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The record store to query
/// * `limit` - How many recent records to include
pub fn load_statistics(store: &dyn RecordStore, limit: usize) -> StorageResult<HarvestStatistics> {
    let total_records = store.count_records()?;
    let recent = store
        .recent_records(limit)?
        .iter()
        .map(RecentRecord::from)
        .collect();

    Ok(HarvestStatistics {
        total_records,
        recent,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");
    println!("Total records: {}", stats.total_records);

    if stats.recent.is_empty() {
        return;
    }

    println!("\nMost recent ({}):", stats.recent.len());
    for record in &stats.recent {
        println!(
            "  #{:<6} {} | {} | {} views | {} | {} lines",
            record.id,
            truncate(&record.title, TITLE_WIDTH),
            record.author,
            record.views,
            record.published,
            record.subtitle_lines
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(width.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
