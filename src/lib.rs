//! Weibo comment crawler
//!
//! This crate walks the paginated comment listing of a Weibo post, including
//! one level of nested replies, normalizes every comment into a flat record
//! and exports the result as a CSV file.

pub mod comment;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Failed to look up author {author_id}: {message}")]
    AuthorLookup { author_id: String, message: String },

    #[error("Failed to fetch comment page {url}: {message}")]
    PageFetch { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Export error: {0}")]
    Export(#[from] output::ExportError),

    #[error("A crawl session is already active")]
    SessionActive,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SessionState,
        to: state::SessionState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while turning a post URL into a [`url::PostReference`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("URL has no author and post segments: {0}")]
    MissingSegments(String),

    #[error("Invalid post token '{token}': {reason}")]
    InvalidToken { token: String, reason: String },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use comment::{NormalizedRecord, RawComment, RawCommentPage};
pub use config::Config;
pub use crawler::{HttpFetcher, PageFetcher, SessionController, SessionEvent, SessionHandle};
pub use output::{serialize_records, ExportError};
pub use state::{CrawlControl, SessionState};
pub use url::{decode_base62, derive_id, encode_id, parse_post_url, PostReference};
