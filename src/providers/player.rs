//! Player response embedded in a watch page
//!
//! The watch page assigns a large JSON object to `ytInitialPlayerResponse`
//! inside an inline script. Only the fields the harvester needs are modeled.

use crate::providers::transcript::CaptionTrack;
use crate::providers::{ProviderError, ProviderResult};
use crate::video::{VideoId, VideoMetadata};
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static PLAYER_RESPONSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ytInitialPlayerResponse\s*=\s*").unwrap());

/// Status value of a playable video
const PLAYABLE: &str = "OK";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub playability_status: Option<PlayabilityStatus>,
    pub video_details: Option<VideoDetails>,
    pub microformat: Option<Microformat>,
    pub captions: Option<Captions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub short_description: String,
    /// Serialized as a decimal string
    pub view_count: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Microformat {
    pub player_microformat_renderer: Option<PlayerMicroformatRenderer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMicroformatRenderer {
    pub publish_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Captions {
    pub player_captions_tracklist_renderer: Option<CaptionTracklist>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTracklist {
    #[serde(default)]
    pub caption_tracks: Vec<CaptionTrack>,
}

/// Finds and decodes the player response in a watch page
///
/// The object is read with a streaming JSON deserializer starting right
/// after the assignment, so braces inside string values are handled.
pub fn extract_player_response(html: &str, video_id: &VideoId) -> ProviderResult<PlayerResponse> {
    let start = PLAYER_RESPONSE_REGEX
        .find(html)
        .map(|m| m.end())
        .ok_or_else(|| ProviderError::PlayerResponseMissing {
            video_id: video_id.to_string(),
        })?;

    let mut stream =
        serde_json::Deserializer::from_str(&html[start..]).into_iter::<PlayerResponse>();

    match stream.next() {
        Some(result) => Ok(result?),
        None => Err(ProviderError::PlayerResponseMissing {
            video_id: video_id.to_string(),
        }),
    }
}

impl PlayerResponse {
    /// Fails unless the platform reports the video as playable
    pub fn ensure_playable(&self, video_id: &VideoId) -> ProviderResult<()> {
        match &self.playability_status {
            Some(status) if status.status == PLAYABLE => Ok(()),
            Some(status) => Err(ProviderError::Unavailable {
                video_id: video_id.to_string(),
                status: status.status.clone(),
                reason: status.reason.clone().unwrap_or_default(),
            }),
            None => Err(ProviderError::MissingField {
                video_id: video_id.to_string(),
                field: "playabilityStatus",
            }),
        }
    }

    /// Maps the response onto `VideoMetadata`
    pub fn metadata(&self, video_id: &VideoId) -> ProviderResult<VideoMetadata> {
        self.ensure_playable(video_id)?;

        let missing = |field| ProviderError::MissingField {
            video_id: video_id.to_string(),
            field,
        };

        let details = self.video_details.as_ref().ok_or_else(|| missing("videoDetails"))?;
        let title = details.title.clone().ok_or_else(|| missing("title"))?;
        let author = details.author.clone().ok_or_else(|| missing("author"))?;

        let views = match details.view_count.as_deref() {
            Some(raw) => raw.parse::<i64>().map_err(|_| ProviderError::InvalidField {
                video_id: video_id.to_string(),
                field: "viewCount",
                value: raw.to_string(),
            })?,
            None => 0,
        };

        let publish_date = self
            .microformat
            .as_ref()
            .and_then(|m| m.player_microformat_renderer.as_ref())
            .and_then(|r| r.publish_date.as_deref())
            .map(|raw| parse_publish_date(raw, video_id))
            .transpose()?;

        Ok(VideoMetadata {
            title,
            author,
            description: details.short_description.clone(),
            views,
            publish_date,
        })
    }

    /// Caption tracks listed for the video, possibly empty
    pub fn caption_tracks(&self) -> &[CaptionTrack] {
        self.captions
            .as_ref()
            .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
            .map(|t| t.caption_tracks.as_slice())
            .unwrap_or(&[])
    }
}

/// Accepts `YYYY-MM-DD` optionally followed by a time part
fn parse_publish_date(raw: &str, video_id: &VideoId) -> ProviderResult<NaiveDate> {
    raw.get(..10)
        .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
        .ok_or_else(|| ProviderError::InvalidField {
            video_id: video_id.to_string(),
            field: "publishDate",
            value: raw.to_string(),
        })
}
