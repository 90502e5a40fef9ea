//! Shared fixtures and fakes for unit tests

use crate::config::{
    Config, CrawlerConfig, OutputConfig, PlatformConfig, RendererConfig, RendererKind,
    UserAgentConfig,
};
use crate::crawler::{CrawlCounters, VideoProcessor};
use crate::discovery::{DiscoveryResult, DiscoverySource, EmptyReason};
use crate::providers::{MetadataProvider, ProviderError, ProviderResult, TranscriptProvider};
use crate::storage::{RecordStore, StorageError, StorageResult, StoredRecord};
use crate::video::{TranscriptFragment, VideoId, VideoMetadata, VideoRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn vid(raw: &str) -> VideoId {
    VideoId::new(raw).unwrap()
}

pub fn crawler_config() -> CrawlerConfig {
    CrawlerConfig {
        landing_url: "https://www.youtube.com/".to_string(),
        max_concurrent_videos: 2,
        queue_capacity: 4,
        min_discovery_interval: 1,
        shutdown_grace_period: 5_000,
        progress_interval: 10,
    }
}

/// Valid configuration using the plain HTTP renderer
pub fn test_config(database_path: &str) -> Config {
    Config {
        crawler: crawler_config(),
        renderer: RendererConfig {
            kind: RendererKind::Http,
            endpoint: None,
            token: None,
            settle_time: 0,
            settle_selector: None,
            request_timeout: 5_000,
        },
        platform: PlatformConfig {
            base_url: "https://www.youtube.com".to_string(),
            transcript_languages: vec!["en".to_string()],
            request_timeout: 5_000,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: database_path.to_string(),
        },
    }
}

/// Minimal watch page embedding a playable player response
///
/// Each track is `(language code, kind, base url)`.
pub fn watch_page(
    video_id: &str,
    title: &str,
    author: &str,
    description: &str,
    view_count: &str,
    publish_date: Option<&str>,
    tracks: &[(&str, Option<&str>, &str)],
) -> String {
    let caption_tracks: Vec<_> = tracks
        .iter()
        .map(|(lang, kind, base_url)| {
            let mut track = json!({ "baseUrl": base_url, "languageCode": lang });
            if let Some(kind) = kind {
                track["kind"] = json!(kind);
            }
            track
        })
        .collect();

    let mut response = json!({
        "playabilityStatus": { "status": "OK" },
        "videoDetails": {
            "videoId": video_id,
            "title": title,
            "author": author,
            "shortDescription": description,
            "viewCount": view_count,
        },
        "captions": {
            "playerCaptionsTracklistRenderer": { "captionTracks": caption_tracks }
        },
    });
    if let Some(date) = publish_date {
        response["microformat"] = json!({
            "playerMicroformatRenderer": { "publishDate": date }
        });
    }

    format!(
        "<html><head><script>var ytInitialPlayerResponse = {};var meta = {{}};</script></head><body></body></html>",
        response
    )
}

pub fn found(ids: &[&str]) -> DiscoveryResult {
    DiscoveryResult::Found(ids.iter().map(|id| vid(id)).collect())
}

/// Discovery source replaying a fixed script, then a fallback forever
pub struct ScriptedDiscovery {
    script: Mutex<VecDeque<DiscoveryResult>>,
    fallback: DiscoveryResult,
    calls: AtomicUsize,
}

impl ScriptedDiscovery {
    pub fn new(script: Vec<DiscoveryResult>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: DiscoveryResult::Empty {
                reason: EmptyReason::NoLinks,
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn repeating(result: DiscoveryResult) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoverySource for ScriptedDiscovery {
    async fn discover(&self) -> DiscoveryResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Metadata and transcript provider answering from the video id alone
///
/// Metadata carries the id as its title so stored records can be traced
/// back to the video that produced them.
#[derive(Default)]
pub struct FakeProvider {
    failing_metadata: HashSet<String>,
    failing_transcripts: HashSet<String>,
    delay: Option<Duration>,
    metadata_calls: Mutex<Vec<VideoId>>,
    transcript_calls: Mutex<Vec<VideoId>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_metadata(mut self, id: &str) -> Self {
        self.failing_metadata.insert(id.to_string());
        self
    }

    pub fn failing_transcript(mut self, id: &str) -> Self {
        self.failing_transcripts.insert(id.to_string());
        self
    }

    /// Makes every metadata call take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn metadata_calls(&self) -> Vec<VideoId> {
        self.metadata_calls.lock().unwrap().clone()
    }

    pub fn transcript_calls(&self) -> Vec<VideoId> {
        self.transcript_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    async fn fetch_metadata(&self, video_id: &VideoId) -> ProviderResult<VideoMetadata> {
        self.metadata_calls.lock().unwrap().push(video_id.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_metadata.contains(video_id.as_str()) {
            return Err(ProviderError::Unavailable {
                video_id: video_id.to_string(),
                status: "ERROR".to_string(),
                reason: "Video unavailable".to_string(),
            });
        }

        Ok(VideoMetadata {
            title: video_id.to_string(),
            author: "A".to_string(),
            description: "D".to_string(),
            views: 10,
            publish_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        })
    }
}

#[async_trait]
impl TranscriptProvider for FakeProvider {
    async fn fetch_transcript(
        &self,
        video_id: &VideoId,
    ) -> ProviderResult<Vec<TranscriptFragment>> {
        self.transcript_calls.lock().unwrap().push(video_id.clone());

        if self.failing_transcripts.contains(video_id.as_str()) {
            return Err(ProviderError::NoTranscript {
                video_id: video_id.to_string(),
            });
        }

        Ok(vec![
            TranscriptFragment::text_only("hi"),
            TranscriptFragment::text_only("there"),
        ])
    }
}

/// In-memory record store; ids start at 1
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<VideoRecord>>,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every append fails
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<VideoRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl RecordStore for MemoryStore {
    fn append(&self, record: &VideoRecord) -> StorageResult<i64> {
        if self.fail {
            return Err(StorageError::Database("disk full".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(records.len() as i64)
    }

    fn count_records(&self) -> StorageResult<u64> {
        Ok(self.records.lock().unwrap().len() as u64)
    }

    fn get_record(&self, id: i64) -> StorageResult<StoredRecord> {
        let records = self.records.lock().unwrap();
        usize::try_from(id - 1)
            .ok()
            .and_then(|index| records.get(index))
            .map(|record| StoredRecord {
                id,
                record: record.clone(),
            })
            .ok_or(StorageError::RecordNotFound(id))
    }

    fn recent_records(&self, limit: usize) -> StorageResult<Vec<StoredRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .enumerate()
            .rev()
            .take(limit)
            .map(|(index, record)| StoredRecord {
                id: index as i64 + 1,
                record: record.clone(),
            })
            .collect())
    }
}

/// Processor wired to the given fakes with fresh counters
pub fn processor(provider: &Arc<FakeProvider>, store: &Arc<MemoryStore>) -> VideoProcessor {
    VideoProcessor::new(
        provider.clone(),
        provider.clone(),
        store.clone(),
        Arc::new(CrawlCounters::new()),
    )
}
