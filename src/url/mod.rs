//! Post URL handling
//!
//! This module turns a public post URL (`https://weibo.com/<uid>/<token>`)
//! into the author id and numeric post id the comment endpoint expects.

mod codec;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export codec functions
pub use codec::{decode_base62, derive_id, encode_id};

/// The post a crawl session targets
///
/// Derived once per session from the input URL and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostReference {
    /// Numeric id of the post author, kept as it appears in the URL
    pub author_id: String,

    /// Numeric post id decoded from the URL token
    pub post_id: u64,
}

/// Parses a post URL into a [`PostReference`]
///
/// The query string and fragment are ignored. The second-to-last path
/// segment is the author id and the last one is the post token, which is
/// decoded with [`derive_id`]. URLs without a scheme are accepted.
///
/// # Examples
///
/// ```
/// use weibo_comment_crawler::url::{derive_id, parse_post_url};
///
/// let post = parse_post_url("https://weibo.com/123456/AbC1dEf?type=comment").unwrap();
/// assert_eq!(post.author_id, "123456");
/// assert_eq!(post.post_id, derive_id("AbC1dEf").unwrap());
/// ```
pub fn parse_post_url(input: &str) -> UrlResult<PostReference> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let parsed = Url::parse(trimmed)
        .or_else(|_| Url::parse(&format!("https://{}", trimmed)))
        .map_err(|e| UrlError::Parse(format!("{}: {}", trimmed, e)))?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let [.., author_id, token] = segments.as_slice() else {
        return Err(UrlError::MissingSegments(trimmed.to_string()));
    };

    let post_id = derive_id(token)?;

    Ok(PostReference {
        author_id: (*author_id).to_string(),
        post_id,
    })
}
