//! Raw comment payloads as returned by the comment listing endpoint
//!
//! Every field is optional on the wire, so the types default generously and
//! the count fields accept both JSON numbers and comma-grouped strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One page of the comment listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCommentPage {
    /// Comments in API order
    #[serde(rename = "data", default)]
    pub comments: Vec<RawComment>,

    /// Continuation cursor; zero means no further pages at this level
    #[serde(rename = "max_id", default, deserialize_with = "lenient_count")]
    pub next_cursor: u64,
}

impl RawCommentPage {
    /// Returns the cursor for the next page, if any
    pub fn next_cursor(&self) -> Option<u64> {
        (self.next_cursor != 0).then_some(self.next_cursor)
    }
}

/// A single comment object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComment {
    #[serde(default, deserialize_with = "lenient_count")]
    pub id: u64,

    #[serde(default)]
    pub idstr: Option<String>,

    /// Present only on nested replies
    #[serde(default)]
    pub rootidstr: Option<String>,

    /// Source timestamp, e.g. `Tue Oct 15 12:34:56 +0800 2024`
    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub user: RawUser,

    #[serde(default)]
    pub text_raw: String,

    #[serde(default, deserialize_with = "lenient_count")]
    pub like_counts: u64,

    /// Number of replies under this comment
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_number: u64,

    /// Location tag such as `来自北京`
    #[serde(default)]
    pub source: Option<String>,
}

impl RawComment {
    /// The comment id as a string, preferring `idstr`
    pub fn id_string(&self) -> String {
        match &self.idstr {
            Some(idstr) if !idstr.is_empty() => idstr.clone(),
            _ => self.id.to_string(),
        }
    }
}

/// The author sub-record of a comment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "lenient_count")]
    pub id: u64,

    #[serde(default)]
    pub screen_name: String,

    #[serde(default)]
    pub verified: bool,

    /// `m`, `f` or `n`
    #[serde(default)]
    pub gender: String,

    #[serde(default, deserialize_with = "lenient_count")]
    pub followers_count: u64,

    #[serde(default, deserialize_with = "lenient_count")]
    pub friends_count: u64,

    /// Membership (SVIP) level; zero when the user has none
    #[serde(default, deserialize_with = "lenient_count")]
    pub svip: u64,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status_total_counter: Option<StatusTotalCounter>,

    #[serde(rename = "fansIcon", default)]
    pub fans_icon: Option<FansIcon>,
}

/// Aggregate reposts/comments/likes counter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusTotalCounter {
    /// Comma-grouped decimal, e.g. `1,234,567`
    #[serde(default, deserialize_with = "lenient_string")]
    pub total_cnt: String,
}

/// Fan badge descriptor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FansIcon {
    #[serde(default)]
    pub icon_url: String,
}

/// Parses a comma-grouped decimal string, yielding zero on failure
pub fn parse_grouped_count(raw: &str) -> u64 {
    let digits: String = raw.trim().chars().filter(|c| *c != ',').collect();
    digits.parse().unwrap_or(0)
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_grouped_count(&s),
        _ => 0,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
