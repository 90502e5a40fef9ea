use crate::discovery::parser::parse_landing_page;
use crate::discovery::renderer::PageRenderer;
use crate::video::VideoId;
use async_trait::async_trait;
use std::fmt;
use url::Url;

/// Why a discovery call produced no candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The page rendered but contained no links at all
    NoLinks,

    /// Links were present but none pointed at a video
    NoVideoLinks { anchors: usize },

    /// Rendering failed; the message describes the failure
    RenderFailed(String),
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLinks => write!(f, "page contained no links"),
            Self::NoVideoLinks { anchors } => {
                write!(f, "none of {} links pointed at a video", anchors)
            }
            Self::RenderFailed(message) => write!(f, "render failed: {}", message),
        }
    }
}

/// Outcome of one discovery call
///
/// Failures never escape a discovery source; they arrive here as
/// `Empty` with a reason, which the crawl loop treats like any other
/// empty result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryResult {
    /// At least one candidate video is currently listed
    Found(Vec<VideoId>),

    /// Nothing usable this time
    Empty { reason: EmptyReason },
}

impl DiscoveryResult {
    /// Builds a result from a candidate list, mapping an empty list to `Empty`
    pub fn from_candidates(candidates: Vec<VideoId>, anchors: usize) -> Self {
        if !candidates.is_empty() {
            Self::Found(candidates)
        } else if anchors == 0 {
            Self::Empty {
                reason: EmptyReason::NoLinks,
            }
        } else {
            Self::Empty {
                reason: EmptyReason::NoVideoLinks { anchors },
            }
        }
    }
}

/// Lists the videos currently present on the platform's landing surface
///
/// Each call is independent and stateless.
#[async_trait]
pub trait DiscoverySource: Send + Sync {
    async fn discover(&self) -> DiscoveryResult;
}

/// Discovery source that renders a landing page and scans it for watch links
pub struct LandingPageSource {
    renderer: Box<dyn PageRenderer>,
    landing_url: Url,
}

impl LandingPageSource {
    pub fn new(renderer: Box<dyn PageRenderer>, landing_url: Url) -> Self {
        Self {
            renderer,
            landing_url,
        }
    }
}

#[async_trait]
impl DiscoverySource for LandingPageSource {
    async fn discover(&self) -> DiscoveryResult {
        let html = match self.renderer.render(self.landing_url.as_str()).await {
            Ok(html) => html,
            Err(e) => {
                return DiscoveryResult::Empty {
                    reason: EmptyReason::RenderFailed(e.to_string()),
                }
            }
        };

        let parsed = parse_landing_page(&html, &self.landing_url);
        tracing::trace!(
            "Scanned {} links, {} distinct videos",
            parsed.anchors,
            parsed.video_ids.len()
        );

        DiscoveryResult::from_candidates(parsed.video_ids, parsed.anchors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::renderer::RenderError;

    struct StaticRenderer(Result<String, u16>);

    #[async_trait]
    impl PageRenderer for StaticRenderer {
        async fn render(&self, _url: &str) -> Result<String, RenderError> {
            match &self.0 {
                Ok(html) => Ok(html.clone()),
                Err(status) => Err(RenderError::Api {
                    status: *status,
                    message: "boom".to_string(),
                }),
            }
        }
    }

    fn source(result: Result<String, u16>) -> LandingPageSource {
        LandingPageSource::new(
            Box::new(StaticRenderer(result)),
            Url::parse("https://www.youtube.com/").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_found_candidates() {
        let html = r#"<a href="/watch?v=abc123">v</a><a href="/">home</a>"#.to_string();
        let result = source(Ok(html)).discover().await;
        assert_eq!(
            result,
            DiscoveryResult::Found(vec![VideoId::new("abc123").unwrap()])
        );
    }

    #[tokio::test]
    async fn test_render_failure_is_empty() {
        let result = source(Err(500)).discover().await;
        match result {
            DiscoveryResult::Empty {
                reason: EmptyReason::RenderFailed(message),
            } => assert!(message.contains("500")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_links_and_no_video_links() {
        let result = source(Ok("<html><body>nothing</body></html>".to_string()))
            .discover()
            .await;
        assert_eq!(
            result,
            DiscoveryResult::Empty {
                reason: EmptyReason::NoLinks
            }
        );

        let result = source(Ok(r#"<a href="/feed">f</a>"#.to_string()))
            .discover()
            .await;
        assert_eq!(
            result,
            DiscoveryResult::Empty {
                reason: EmptyReason::NoVideoLinks { anchors: 1 }
            }
        );
    }
}
