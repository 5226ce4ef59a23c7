//! Record extraction
//!
//! Maps a raw comment into a [`NormalizedRecord`]. Extraction never fails:
//! malformed sub-fields degrade to empty strings or zero.

use crate::comment::raw::{parse_grouped_count, RawComment};
use crate::comment::record::NormalizedRecord;
use crate::comment::FetchLevel;
use chrono::DateTime;
use std::fmt::Write;

/// Timestamp layout used by the comment endpoint
const SOURCE_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Converts raw comments into normalized records
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    timestamp_format: String,
}

impl RecordExtractor {
    /// Creates an extractor rendering timestamps with the given chrono format
    pub fn new(timestamp_format: impl Into<String>) -> Self {
        Self {
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Extracts one record
    ///
    /// The sequence number is assigned by the caller at acceptance time.
    /// Comments fetched at the top level never carry a parent id.
    pub fn extract(&self, raw: &RawComment, level: FetchLevel, sequence: u64) -> NormalizedRecord {
        let user = &raw.user;

        let parent_id = match level {
            FetchLevel::TopLevel => String::new(),
            FetchLevel::Reply => raw.rootidstr.clone().unwrap_or_default(),
        };

        let icon_url = user.fans_icon.as_ref().map(|icon| icon.icon_url.as_str()).unwrap_or("");
        let activity_count = user
            .status_total_counter
            .as_ref()
            .map(|counter| parse_grouped_count(&counter.total_cnt))
            .unwrap_or(0);

        NormalizedRecord {
            sequence,
            comment_id: raw.id_string(),
            parent_id,
            author_id: user.id.to_string(),
            created_at: format_timestamp(&raw.created_at, &self.timestamp_format),
            author_name: user.screen_name.clone(),
            gender: gender_label(&user.gender).to_string(),
            text: raw.text_raw.clone(),
            like_count: raw.like_counts,
            reply_count: raw.total_number,
            fan_badge: fan_badge_label(icon_url),
            source_tag: source_tag(raw.source.as_deref()),
            author_bio: user.description.clone().unwrap_or_default(),
            verified: verified_label(user.verified).to_string(),
            membership_tier: membership_tier(user.svip),
            follower_count: user.followers_count,
            following_count: user.friends_count,
            activity_count,
        }
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new("%Y-%m-%d %H:%M:%S")
    }
}

/// Renders a source timestamp in its own offset
///
/// Timestamps that do not match the source layout, or that cannot be
/// rendered with `format`, are passed through as-is.
pub fn format_timestamp(raw: &str, format: &str) -> String {
    let Ok(dt) = DateTime::parse_from_str(raw, SOURCE_TIMESTAMP_FORMAT) else {
        return raw.to_string();
    };

    let mut rendered = String::new();
    match write!(rendered, "{}", dt.format(format)) {
        Ok(()) => rendered,
        Err(_) => raw.to_string(),
    }
}

/// Decodes the fan badge tier and level from its icon URL
///
/// The character seven places from the end selects the tier, the one five
/// places from the end is the level digit.
pub fn fan_badge_label(icon_url: &str) -> String {
    let chars: Vec<char> = icon_url.chars().collect();
    if chars.len() < 7 {
        return String::new();
    }

    let tier = match chars[chars.len() - 7] {
        '1' => "bronze",
        '2' => "gold",
        '3' => "diamond",
        _ => return String::new(),
    };
    let level = chars[chars.len() - 5];

    format!("{}{}", tier, level)
}

/// Drops the two-character marker in front of the location
pub fn source_tag(source: Option<&str>) -> String {
    source.map(|s| s.chars().skip(2).collect()).unwrap_or_default()
}

pub fn gender_label(code: &str) -> &'static str {
    match code {
        "m" => "male",
        "f" => "female",
        _ => "unknown",
    }
}

pub fn verified_label(verified: bool) -> &'static str {
    if verified {
        "yes"
    } else {
        "no"
    }
}

fn membership_tier(svip: u64) -> String {
    if svip == 0 {
        String::new()
    } else {
        svip.to_string()
    }
}
