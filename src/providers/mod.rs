//! Metadata and transcript providers
//!
//! The crawl treats both as replaceable collaborators behind traits. The
//! bundled implementation, `WatchPageClient`, reads the player response
//! embedded in a video's watch page and the caption track it links to.

mod client;
mod player;
mod transcript;

pub use client::WatchPageClient;
pub use player::{extract_player_response, PlayerResponse};
pub use transcript::{parse_transcript_xml, select_caption_track, CaptionTrack};

use crate::crawler::FetchError;
use crate::video::{TranscriptFragment, VideoId, VideoMetadata};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by metadata and transcript providers
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("No player response found on watch page for {video_id}")]
    PlayerResponseMissing { video_id: String },

    #[error("Malformed player response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Video {video_id} is unavailable ({status}): {reason}")]
    Unavailable {
        video_id: String,
        status: String,
        reason: String,
    },

    #[error("Field '{field}' missing for {video_id}")]
    MissingField {
        video_id: String,
        field: &'static str,
    },

    #[error("Field '{field}' has invalid value '{value}' for {video_id}")]
    InvalidField {
        video_id: String,
        field: &'static str,
        value: String,
    },

    #[error("No transcript available for {video_id}")]
    NoTranscript { video_id: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Fetches descriptive fields for a video
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn fetch_metadata(&self, video_id: &VideoId) -> ProviderResult<VideoMetadata>;
}

/// Fetches the ordered caption fragments for a video
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    async fn fetch_transcript(&self, video_id: &VideoId)
        -> ProviderResult<Vec<TranscriptFragment>>;
}
