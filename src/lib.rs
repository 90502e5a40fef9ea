//! Tube-Harvest: a random-walk video metadata and caption harvester
//!
//! This crate repeatedly renders a video platform's landing page, picks one
//! newly discovered video per pass, and hands it to a bounded pool of workers
//! that fetch its metadata and caption track and append both to SQLite.

pub mod config;
pub mod crawler;
pub mod discovery;
pub mod output;
pub mod providers;
pub mod storage;
pub mod video;

#[cfg(test)]
pub(crate) mod testing;

use thiserror::Error;

/// Main error type for Tube-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Renderer error: {0}")]
    Render(#[from] discovery::RenderError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Tube-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlCounters, VideoProcessor, VisitedSet, WorkerPool};
pub use video::{flatten_transcript, TranscriptFragment, VideoId, VideoMetadata, VideoRecord};
