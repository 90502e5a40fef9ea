//! Caption track selection and timed-text parsing

use crate::video::TranscriptFragment;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

/// `kind` value of automatically generated tracks
const GENERATED_KIND: &str = "asr";

/// Query parameter selecting an alternative timed-text format
const FORMAT_PARAM: &str = "fmt";

/// One caption track listed in the player response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    pub fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some(GENERATED_KIND)
    }

    /// Track URL forced to the default `<transcript>` XML format
    pub fn timedtext_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != FORMAT_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }

        Ok(url)
    }
}

/// Picks a caption track by language preference
///
/// For each language in order, a manually created track wins over a
/// generated one. An empty preference list takes the first listed track.
pub fn select_caption_track<'a>(
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Option<&'a CaptionTrack> {
    if languages.is_empty() {
        return tracks.first();
    }

    languages.iter().find_map(|lang| {
        let mut candidates = tracks.iter().filter(|t| &t.language_code == lang);
        let manual = candidates.clone().find(|t| !t.is_generated());
        manual.or_else(|| candidates.next())
    })
}

/// Parses a `<transcript><text start=".." dur="..">..</text></transcript>` document
///
/// Fragment order follows document order. Formatting tags inside the text
/// (`&lt;i&gt;`) are stripped, double-escaped entities decoded, and
/// fragments with no text dropped.
pub fn parse_transcript_xml(xml: &str) -> Vec<TranscriptFragment> {
    let document = Html::parse_fragment(xml);
    let Ok(selector) = Selector::parse("text") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let raw: String = element.text().collect();
            let text = strip_markup(&raw);
            if text.is_empty() {
                return None;
            }

            let attr = |name: &str| {
                element
                    .value()
                    .attr(name)
                    .and_then(|v| v.parse::<f64>().ok())
                    .unwrap_or(0.0)
            };

            Some(TranscriptFragment {
                text,
                start: attr("start"),
                duration: attr("dur"),
            })
        })
        .collect()
}

/// Second decoding pass: caption text is itself HTML-escaped
fn strip_markup(raw: &str) -> String {
    if !raw.contains('&') && !raw.contains('<') {
        return raw.trim().to_string();
    }

    Html::parse_fragment(raw)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}
