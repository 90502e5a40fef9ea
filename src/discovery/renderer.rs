//! Page renderers
//!
//! A renderer turns a URL into markup. `BrowserlessRenderer` executes the
//! page's scripts in headless Chrome so client-side video grids are present;
//! `HttpRenderer` returns the server response as-is.

use crate::config::{RendererConfig, RendererKind, UserAgentConfig};
use crate::crawler::{build_http_client, fetch_text, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Renderer API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Renderer is not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        RenderError::Network(err.to_string())
    }
}

/// Produces fully rendered markup for a URL
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Renders pages through a Browserless `/content` endpoint
pub struct BrowserlessRenderer {
    client: Client,
    endpoint: String,
    token: Option<String>,
    settle_time_ms: u64,
    settle_selector: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_selector: Option<WaitForSelector<'a>>,
}

#[derive(Serialize)]
struct WaitForSelector<'a> {
    selector: &'a str,
    timeout: u64,
}

impl BrowserlessRenderer {
    pub fn new(
        config: &RendererConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, RenderError> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| RenderError::NotConfigured("missing browserless endpoint".into()))?;

        Ok(Self {
            client: build_http_client(user_agent, config.request_timeout())?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            settle_time_ms: config.settle_time,
            settle_selector: config.settle_selector.clone(),
        })
    }

    /// Waits for the settle selector when one is configured, otherwise for
    /// the fixed settle time
    fn content_request<'a>(&'a self, url: &'a str) -> ContentRequest<'a> {
        match self.settle_selector.as_deref() {
            Some(selector) => ContentRequest {
                url,
                wait_for_timeout: None,
                wait_for_selector: Some(WaitForSelector {
                    selector,
                    timeout: self.settle_time_ms,
                }),
            },
            None => ContentRequest {
                url,
                wait_for_timeout: Some(self.settle_time_ms),
                wait_for_selector: None,
            },
        }
    }
}

#[async_trait]
impl PageRenderer for BrowserlessRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let mut endpoint = format!("{}/content", self.endpoint);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let resp = self
            .client
            .post(&endpoint)
            .json(&self.content_request(url))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RenderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}

/// Fetches pages with a plain GET
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    pub fn new(
        config: &RendererConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            client: build_http_client(user_agent, config.request_timeout())?,
        })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        Ok(fetch_text(&self.client, url).await?)
    }
}

/// Builds the renderer selected by the configuration
pub fn build_renderer(
    config: &RendererConfig,
    user_agent: &UserAgentConfig,
) -> Result<Box<dyn PageRenderer>, RenderError> {
    Ok(match config.kind {
        RendererKind::Browserless => Box::new(BrowserlessRenderer::new(config, user_agent)?),
        RendererKind::Http => Box::new(HttpRenderer::new(config, user_agent)?),
    })
}
