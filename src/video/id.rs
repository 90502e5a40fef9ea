use std::fmt;
use url::Url;

/// Path every watch link carries
const WATCH_PATH: &str = "/watch";

/// Query parameter holding the video identifier
const VIDEO_PARAM: &str = "v";

/// Opaque identifier naming a single video on the platform
///
/// This is the dedup key for the whole crawl. Two links that differ only in
/// extra query parameters (`&t=`, `&list=`) resolve to the same `VideoId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VideoId(String);

impl VideoId {
    /// Creates an identifier from a raw id string
    ///
    /// Returns `None` if the string is empty or contains characters outside
    /// `[A-Za-z0-9_-]`.
    pub fn new(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return None;
        }

        Some(Self(raw.to_string()))
    }

    /// Derives an identifier from a discovered link
    ///
    /// The link is resolved against `base` first, so relative hrefs such as
    /// `/watch?v=abc123` work. Only links whose path is exactly `/watch` and
    /// that carry a `v` parameter qualify.
    ///
    /// # Examples
    ///
    /// ```
    /// use tube_harvest::video::VideoId;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://www.youtube.com/").unwrap();
    /// let id = VideoId::from_link("/watch?v=abc123&t=42s", &base).unwrap();
    /// assert_eq!(id.as_str(), "abc123");
    ///
    /// assert!(VideoId::from_link("/channel/xyz", &base).is_none());
    /// ```
    pub fn from_link(href: &str, base: &Url) -> Option<Self> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let url = base.join(href).ok()?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }

        if url.path() != WATCH_PATH {
            return None;
        }

        url.query_pairs()
            .find(|(key, _)| key == VIDEO_PARAM)
            .and_then(|(_, value)| Self::new(&value))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the watch-page URL for this video under `base`
    pub fn watch_url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut url = base.join(WATCH_PATH)?;
        url.query_pairs_mut().append_pair(VIDEO_PARAM, &self.0);
        Ok(url)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
