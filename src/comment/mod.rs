//! Comment payloads and record extraction
//!
//! - `raw`: serde types mirroring the comment listing JSON
//! - `record`: the flat, export-ready [`NormalizedRecord`]
//! - `extract`: the mapping between the two

mod extract;
mod raw;
mod record;

pub use extract::{
    fan_badge_label, format_timestamp, gender_label, source_tag, verified_label, RecordExtractor,
};
pub use raw::{parse_grouped_count, FansIcon, RawComment, RawCommentPage, RawUser, StatusTotalCounter};
pub use record::{NormalizedRecord, RECORD_HEADERS};

use std::fmt;

/// Depth of a comment listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchLevel {
    /// Comments attached directly to the post
    TopLevel,
    /// Replies attached to a top-level comment
    Reply,
}

impl FetchLevel {
    /// Value of the `fetch_level` query parameter
    pub fn as_param(&self) -> u8 {
        match self {
            Self::TopLevel => 0,
            Self::Reply => 1,
        }
    }
}

impl fmt::Display for FetchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_param())
    }
}
