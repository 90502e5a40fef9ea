use crate::config::{PlatformConfig, UserAgentConfig};
use crate::crawler::{build_http_client, fetch_text};
use crate::providers::player::{extract_player_response, PlayerResponse};
use crate::providers::transcript::{parse_transcript_xml, select_caption_track};
use crate::providers::{MetadataProvider, ProviderError, ProviderResult, TranscriptProvider};
use crate::video::{TranscriptFragment, VideoId, VideoMetadata};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Metadata and transcript provider backed by the platform's watch page
///
/// Every call fetches the watch page fresh; nothing is cached between the
/// metadata and transcript steps of a video.
pub struct WatchPageClient {
    client: Client,
    base_url: Url,
    languages: Vec<String>,
}

impl WatchPageClient {
    pub fn new(platform: &PlatformConfig, user_agent: &UserAgentConfig) -> crate::Result<Self> {
        Ok(Self {
            client: build_http_client(user_agent, platform.request_timeout())?,
            base_url: Url::parse(&platform.base_url)?,
            languages: platform.transcript_languages.clone(),
        })
    }

    async fn player_response(&self, video_id: &VideoId) -> ProviderResult<PlayerResponse> {
        let url = video_id.watch_url(&self.base_url)?;
        let html = fetch_text(&self.client, url.as_str()).await?;
        extract_player_response(&html, video_id)
    }
}

#[async_trait]
impl MetadataProvider for WatchPageClient {
    async fn fetch_metadata(&self, video_id: &VideoId) -> ProviderResult<VideoMetadata> {
        self.player_response(video_id).await?.metadata(video_id)
    }
}

#[async_trait]
impl TranscriptProvider for WatchPageClient {
    async fn fetch_transcript(
        &self,
        video_id: &VideoId,
    ) -> ProviderResult<Vec<TranscriptFragment>> {
        let response = self.player_response(video_id).await?;
        response.ensure_playable(video_id)?;

        let no_transcript = || ProviderError::NoTranscript {
            video_id: video_id.to_string(),
        };

        let track = select_caption_track(response.caption_tracks(), &self.languages)
            .ok_or_else(no_transcript)?;
        tracing::trace!(
            "Using {} caption track for {} (generated: {})",
            track.language_code,
            video_id,
            track.is_generated()
        );

        let url = track.timedtext_url()?;
        let xml = fetch_text(&self.client, url.as_str()).await?;
        let fragments = parse_transcript_xml(&xml);

        if fragments.is_empty() {
            return Err(no_transcript());
        }
        Ok(fragments)
    }
}
