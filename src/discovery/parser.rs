//! Landing page link extraction
//!
//! Scans rendered markup for anchors whose target is a video watch page and
//! turns them into `VideoId`s.

use crate::video::VideoId;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Video links found on a rendered page
#[derive(Debug, Clone, Default)]
pub struct ParsedLanding {
    /// Number of `<a href>` elements scanned
    pub anchors: usize,

    /// Distinct video identifiers, in first-seen order
    pub video_ids: Vec<VideoId>,
}

/// Extracts the distinct video identifiers linked from a page
///
/// # Extraction Rules
///
/// - Only `<a href="...">` elements are considered
/// - The href is resolved against `base_url`
/// - It must point at `/watch` with a non-empty `v` parameter
/// - Repeated links to the same video (thumbnail + title) count once
///
/// # Example
///
/// ```
/// use tube_harvest::discovery::parse_landing_page;
/// use url::Url;
///
/// let html = r#"<a href="/watch?v=abc123">A</a><a href="/watch?v=abc123&t=5">A</a>"#;
/// let base = Url::parse("https://www.youtube.com/").unwrap();
/// let parsed = parse_landing_page(html, &base);
/// assert_eq!(parsed.anchors, 2);
/// assert_eq!(parsed.video_ids.len(), 1);
/// ```
pub fn parse_landing_page(html: &str, base_url: &Url) -> ParsedLanding {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return ParsedLanding::default();
    };

    let mut seen = HashSet::new();
    let mut parsed = ParsedLanding::default();

    for element in document.select(&selector) {
        parsed.anchors += 1;

        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(id) = VideoId::from_link(href, base_url) {
            if seen.insert(id.clone()) {
                parsed.video_ids.push(id);
            }
        }
    }

    parsed
}
