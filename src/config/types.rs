use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Tube-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub renderer: RendererConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl loop and worker pool configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Page rendered on every discovery pass
    pub landing_url: String,

    /// Maximum number of videos processed at the same time
    pub max_concurrent_videos: u32,

    /// Number of dispatched videos allowed to wait for a free worker
    pub queue_capacity: u32,

    /// Minimum time between the starts of two discovery calls (milliseconds)
    pub min_discovery_interval: u64,

    /// Time given to queued and in-flight videos after shutdown is requested (milliseconds)
    pub shutdown_grace_period: u64,

    /// Number of loop iterations between progress log lines
    pub progress_interval: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            landing_url: "https://www.youtube.com/".to_string(),
            max_concurrent_videos: 4,
            queue_capacity: 16,
            min_discovery_interval: 1000,
            shutdown_grace_period: 30_000,
            progress_interval: 10,
        }
    }
}

impl CrawlerConfig {
    pub fn min_discovery_interval(&self) -> Duration {
        Duration::from_millis(self.min_discovery_interval)
    }

    pub fn shutdown_grace_period(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_period)
    }
}

/// Which page renderer backs the discovery source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// Headless Chrome behind a Browserless `/content` endpoint
    Browserless,
    /// Plain HTTP GET, no script execution
    Http,
}

/// Landing page renderer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RendererConfig {
    pub kind: RendererKind,

    /// Browserless base URL (required when `kind = "browserless"`)
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    /// Fixed wait for client-side content to settle (milliseconds)
    #[serde(default = "default_settle_time")]
    pub settle_time: u64,

    /// CSS selector whose appearance marks the page as rendered
    #[serde(default)]
    pub settle_selector: Option<String>,

    #[serde(default = "default_render_timeout")]
    pub request_timeout: u64,
}

fn default_settle_time() -> u64 {
    5000
}

fn default_render_timeout() -> u64 {
    60_000
}

impl RendererConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }
}

/// Video platform endpoints used by the metadata and transcript providers
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PlatformConfig {
    pub base_url: String,

    /// Caption languages in order of preference; empty takes the first track
    pub transcript_languages: Vec<String>,

    pub request_timeout: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.youtube.com".to_string(),
            transcript_languages: vec!["en".to_string()],
            request_timeout: 30_000,
        }
    }
}

impl PlatformConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./youtube_videos.db".to_string(),
        }
    }
}
