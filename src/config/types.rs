use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure
///
/// Every section has defaults, so an empty file (or no file) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Comments requested per page (`count` parameter)
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Accepted records between two cool-downs
    #[serde(rename = "cooldown-interval", default = "default_cooldown_interval")]
    pub cooldown_interval: u64,

    /// Length of a cool-down (seconds)
    #[serde(rename = "cooldown-secs", default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Extra attempts for a failed page fetch
    #[serde(rename = "max-retries", default)]
    pub max_retries: u32,

    /// Delay between fetch attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl CrawlerConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            cooldown_interval: default_cooldown_interval(),
            cooldown_secs: default_cooldown_secs(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Site root the API paths are appended to
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Raw `Cookie` header value copied from a logged-in browser session
    #[serde(default)]
    pub cookie: Option<String>,

    /// Request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Value of the `locale` query parameter
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            referer: default_referer(),
            user_agent: default_user_agent(),
            cookie: None,
            timeout_secs: default_timeout_secs(),
            locale: default_locale(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the CSV export is written to
    #[serde(default = "default_directory")]
    pub directory: String,

    /// File name prefix used when the author name is unknown
    #[serde(rename = "fallback-name", default = "default_fallback_name")]
    pub fallback_name: String,

    /// chrono format for the comment timestamp column
    #[serde(rename = "timestamp-format", default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            fallback_name: default_fallback_name(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_page_size() -> u32 {
    20
}

fn default_cooldown_interval() -> u64 {
    100
}

fn default_cooldown_secs() -> u64 {
    5
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_base_url() -> String {
    "https://weibo.com".to_string()
}

fn default_referer() -> String {
    "https://weibo.com/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_locale() -> String {
    "zh-CN".to_string()
}

fn default_directory() -> String {
    ".".to_string()
}

fn default_fallback_name() -> String {
    "weibo-comments".to_string()
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}
