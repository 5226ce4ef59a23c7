//! Comment page fetcher
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with site-identifying headers
//! - Requesting one page of the comment listing
//! - Looking up the post author's display name
//! - Classifying non-2xx and malformed responses as errors

use crate::comment::{FetchLevel, RawCommentPage};
use crate::config::ClientConfig;
use crate::CrawlerError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE, REFERER};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const COMMENTS_PATH: &str = "ajax/statuses/buildComments";
const PROFILE_PATH: &str = "ajax/profile/info";

/// One request against the comment listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Author of the post being crawled
    pub author_id: String,

    /// Post id for top-level pages, comment id for reply pages
    pub target_id: u64,

    /// Continuation cursor; `None` requests the first page
    pub cursor: Option<u64>,

    pub level: FetchLevel,
}

impl PageRequest {
    pub fn first_page(author_id: impl Into<String>, target_id: u64, level: FetchLevel) -> Self {
        Self {
            author_id: author_id.into(),
            target_id,
            cursor: None,
            level,
        }
    }
}

/// Source of comment pages and author metadata
///
/// The traversal only talks to the site through this trait, so tests can
/// substitute an in-memory implementation.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page of comments
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawCommentPage, CrawlerError>;

    /// Returns the display name of a user
    async fn lookup_author_name(&self, author_id: &str) -> Result<String, CrawlerError>;
}

/// Builds an HTTP client with the configured headers
///
/// # Arguments
///
/// * `config` - The client configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(CrawlerError)` - A header value was invalid or the client failed to build
pub fn build_http_client(config: &ClientConfig) -> Result<Client, CrawlerError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(REFERER, header_value("referer", &config.referer)?);
    if let Some(cookie) = &config.cookie {
        headers.insert(COOKIE, header_value("cookie", cookie)?);
    }

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, CrawlerError> {
    HeaderValue::from_str(value).map_err(|e| {
        CrawlerError::Config(crate::ConfigError::Validation(format!(
            "invalid {} header: {}",
            name, e
        )))
    })
}

/// [`PageFetcher`] backed by the site's JSON endpoints
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    page_size: u32,
    locale: String,
}

impl HttpFetcher {
    /// Creates a fetcher from the client configuration
    pub fn new(config: &ClientConfig, page_size: u32) -> Result<Self, CrawlerError> {
        let client = build_http_client(config)?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            CrawlerError::Config(crate::ConfigError::InvalidUrl(format!(
                "Invalid base_url: {}",
                e
            )))
        })?;

        Ok(Self {
            client,
            base_url,
            page_size,
            locale: config.locale.clone(),
        })
    }

    /// Builds the comment listing URL for a request
    pub fn comments_url(&self, request: &PageRequest) -> Result<Url, CrawlerError> {
        let mut url = self.endpoint(COMMENTS_PATH)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("flow", "1")
                .append_pair("is_reload", "1")
                .append_pair("id", &request.target_id.to_string())
                .append_pair("is_show_bulletin", "2")
                .append_pair("is_mix", "0")
                .append_pair("count", &self.page_size.to_string())
                .append_pair("uid", &request.author_id)
                .append_pair("fetch_level", &request.level.as_param().to_string())
                .append_pair("locale", &self.locale);
            if let Some(cursor) = request.cursor.filter(|c| *c != 0) {
                query.append_pair("max_id", &cursor.to_string());
            }
        }
        Ok(url)
    }

    /// Builds the profile lookup URL for a user
    pub fn profile_url(&self, author_id: &str) -> Result<Url, CrawlerError> {
        let mut url = self.endpoint(PROFILE_PATH)?;
        url.query_pairs_mut().append_pair("custom", author_id);
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url, CrawlerError> {
        self.base_url.join(path).map_err(|e| CrawlerError::PageFetch {
            url: format!("{}{}", self.base_url, path),
            message: e.to_string(),
        })
    }

    /// Sends a GET and returns the body of a 2xx response
    async fn get_body(&self, url: &Url) -> Result<String, CrawlerError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|source| CrawlerError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlerError::PageFetch {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        response.text().await.map_err(|source| CrawlerError::Http {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawCommentPage, CrawlerError> {
        let url = self.comments_url(request)?;
        tracing::debug!("Fetching comment page: {}", url);

        let body = self.get_body(&url).await?;
        let page: RawCommentPage =
            serde_json::from_str(&body).map_err(|e| CrawlerError::PageFetch {
                url: url.to_string(),
                message: format!("malformed JSON: {}", e),
            })?;

        tracing::debug!(
            "Page for {} (level {}) returned {} comments, next cursor {}",
            request.target_id,
            request.level,
            page.comments.len(),
            page.next_cursor
        );
        Ok(page)
    }

    async fn lookup_author_name(&self, author_id: &str) -> Result<String, CrawlerError> {
        let lookup_error = |message: String| CrawlerError::AuthorLookup {
            author_id: author_id.to_string(),
            message,
        };

        let url = self.profile_url(author_id)?;
        tracing::debug!("Looking up author: {}", url);

        let body = self.get_body(&url).await.map_err(|e| lookup_error(e.to_string()))?;
        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| lookup_error(format!("malformed JSON: {}", e)))?;

        json.pointer("/data/user/screen_name")
            .and_then(|name| name.as_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| lookup_error("response has no data.user.screen_name".to_string()))
    }
}
