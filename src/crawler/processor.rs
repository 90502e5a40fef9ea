//! One unit of work: metadata, transcript, flatten, persist

use crate::crawler::CrawlCounters;
use crate::providers::{MetadataProvider, ProviderError, TranscriptProvider};
use crate::storage::{RecordStore, StorageError};
use crate::video::{VideoId, VideoRecord};
use std::sync::Arc;
use thiserror::Error;

/// Failure of a single video's processing
///
/// Never escapes the worker; it is logged with the video id and counted.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("metadata fetch failed: {0}")]
    Metadata(#[source] ProviderError),

    #[error("transcript fetch failed: {0}")]
    Transcript(#[source] ProviderError),

    #[error("store write failed: {0}")]
    Store(#[source] StorageError),
}

/// What happened to one dispatched video
#[derive(Debug)]
pub enum ProcessOutcome {
    Stored { record_id: i64 },
    Failed(ProcessingError),
}

/// Composes the providers and the record store into one unit of work
///
/// Cheap to clone; every dispatched job gets its own handle.
#[derive(Clone)]
pub struct VideoProcessor {
    metadata: Arc<dyn MetadataProvider>,
    transcripts: Arc<dyn TranscriptProvider>,
    store: Arc<dyn RecordStore>,
    counters: Arc<CrawlCounters>,
}

impl VideoProcessor {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        transcripts: Arc<dyn TranscriptProvider>,
        store: Arc<dyn RecordStore>,
        counters: Arc<CrawlCounters>,
    ) -> Self {
        Self {
            metadata,
            transcripts,
            store,
            counters,
        }
    }

    pub fn counters(&self) -> &Arc<CrawlCounters> {
        &self.counters
    }

    /// Runs the steps in order, stopping at the first failure
    ///
    /// Nothing is written unless every step before the store succeeded.
    pub async fn process(&self, video_id: &VideoId) -> ProcessOutcome {
        let metadata = match self.metadata.fetch_metadata(video_id).await {
            Ok(metadata) => metadata,
            Err(e) => return ProcessOutcome::Failed(ProcessingError::Metadata(e)),
        };

        let fragments = match self.transcripts.fetch_transcript(video_id).await {
            Ok(fragments) => fragments,
            Err(e) => return ProcessOutcome::Failed(ProcessingError::Transcript(e)),
        };

        let record = VideoRecord::new(metadata, &fragments);
        match self.append(record).await {
            Ok(record_id) => ProcessOutcome::Stored { record_id },
            Err(e) => ProcessOutcome::Failed(ProcessingError::Store(e)),
        }
    }

    /// Worker entry point: processes, logs and counts the outcome
    pub async fn run(self, video_id: VideoId) {
        tracing::debug!(video_id = %video_id, "Processing video");

        match self.process(&video_id).await {
            ProcessOutcome::Stored { record_id } => {
                self.counters.record_stored();
                tracing::info!(video_id = %video_id, record_id, "Stored video");
            }
            ProcessOutcome::Failed(e) => {
                self.counters.record_failed();
                tracing::warn!(video_id = %video_id, "Video skipped: {}", e);
            }
        }
    }

    async fn append(&self, record: VideoRecord) -> Result<i64, StorageError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.append(&record))
            .await
            .map_err(|e| StorageError::Database(format!("store task failed: {e}")))?
    }
}
