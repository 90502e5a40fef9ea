//! Video data model
//!
//! This module defines the values that flow through a crawl:
//! - `VideoId`: the dedup key derived from a discovered link
//! - `VideoMetadata`: descriptive fields from the metadata provider
//! - `TranscriptFragment`: one caption line from the transcript provider
//! - `VideoRecord`: the unit persisted to the record store

mod id;

pub use id::VideoId;

use chrono::NaiveDate;

/// Descriptive fields for a single video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    pub views: i64,
    /// Absent when the platform does not expose a publish date
    pub publish_date: Option<NaiveDate>,
}

/// One caption fragment in a transcript track
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptFragment {
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptFragment {
    /// Creates a fragment with no timing information
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start: 0.0,
            duration: 0.0,
        }
    }
}

/// A fully processed video, ready to be appended to the record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub title: String,
    pub author: String,
    pub description: String,
    pub views: i64,
    pub publish_date: Option<NaiveDate>,
    pub subtitles: String,
}

impl VideoRecord {
    /// Combines metadata with a transcript, flattening the fragments
    pub fn new(metadata: VideoMetadata, fragments: &[TranscriptFragment]) -> Self {
        Self {
            title: metadata.title,
            author: metadata.author,
            description: metadata.description,
            views: metadata.views,
            publish_date: metadata.publish_date,
            subtitles: flatten_transcript(fragments),
        }
    }
}

/// Joins fragment texts in their original order, one fragment per line
///
/// # Examples
///
/// ```
/// use tube_harvest::video::{flatten_transcript, TranscriptFragment};
///
/// let fragments = vec![
///     TranscriptFragment::text_only("a"),
///     TranscriptFragment::text_only("b"),
///     TranscriptFragment::text_only("c"),
/// ];
/// assert_eq!(flatten_transcript(&fragments), "a\nb\nc");
/// ```
pub fn flatten_transcript(fragments: &[TranscriptFragment]) -> String {
    fragments
        .iter()
        .map(|fragment| fragment.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
