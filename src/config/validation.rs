use crate::config::types::{ClientConfig, Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;
use chrono::format::{Item, StrftimeItems};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_client_config(&config.client)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 || config.page_size > 200 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 200, got {}",
            config.page_size
        )));
    }

    if config.cooldown_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "cooldown_interval must be >= 1, got {}",
            config.cooldown_interval
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates HTTP client configuration
fn validate_client_config(config: &ClientConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            base.scheme()
        )));
    }

    Url::parse(&config.referer)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid referer: {}", e)))?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let Some(cookie) = &config.cookie {
        if cookie.contains(|c: char| c == '\r' || c == '\n') {
            return Err(ConfigError::Validation(
                "cookie cannot contain line breaks".to_string(),
            ));
        }
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "directory cannot be empty".to_string(),
        ));
    }

    if config.fallback_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fallback_name cannot be empty".to_string(),
        ));
    }

    if config.timestamp_format.is_empty() {
        return Err(ConfigError::Validation(
            "timestamp_format cannot be empty".to_string(),
        ));
    }

    if StrftimeItems::new(&config.timestamp_format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::Validation(format!(
            "timestamp_format '{}' is not a valid chrono format",
            config.timestamp_format
        )));
    }

    Ok(())
}
