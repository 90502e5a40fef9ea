use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, PlatformConfig, RendererConfig, RendererKind,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound on concurrently processed videos
const MAX_WORKERS: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_renderer_config(&config.renderer)?;
    validate_platform_config(&config.platform)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl loop and worker pool settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("landing-url", &config.landing_url)?;

    if config.max_concurrent_videos < 1 || config.max_concurrent_videos > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-videos must be between 1 and {}, got {}",
            MAX_WORKERS, config.max_concurrent_videos
        )));
    }

    if config.queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "queue-capacity must be >= 1, got {}",
            config.queue_capacity
        )));
    }

    if config.progress_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "progress-interval must be >= 1, got {}",
            config.progress_interval
        )));
    }

    Ok(())
}

/// Validates renderer settings
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.kind == RendererKind::Browserless {
        let endpoint = config.endpoint.as_deref().ok_or_else(|| {
            ConfigError::Validation("renderer endpoint is required for browserless".to_string())
        })?;
        validate_http_url("renderer endpoint", endpoint)?;
    }

    if let Some(selector) = &config.settle_selector {
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(
                "settle-selector cannot be empty".to_string(),
            ));
        }
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "renderer request-timeout must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates platform endpoint settings
fn validate_platform_config(config: &PlatformConfig) -> Result<(), ConfigError> {
    validate_http_url("platform base-url", &config.base_url)?;

    if config
        .transcript_languages
        .iter()
        .any(|lang| lang.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "transcript-languages cannot contain empty entries".to_string(),
        ));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "platform request-timeout must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Requires an absolute http(s) URL
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Must contain exactly one @ with text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
