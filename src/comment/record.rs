//! The flat comment record written to the export

/// Flattened, export-ready comment row
///
/// Field order matches [`RECORD_HEADERS`] and the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// 1-based acceptance order, shared by top-level comments and replies
    pub sequence: u64,
    pub comment_id: String,
    /// Id of the top-level comment this is a reply to; empty for top-level
    pub parent_id: String,
    pub author_id: String,
    pub created_at: String,
    pub author_name: String,
    pub gender: String,
    pub text: String,
    pub like_count: u64,
    pub reply_count: u64,
    pub fan_badge: String,
    pub source_tag: String,
    pub author_bio: String,
    pub verified: String,
    pub membership_tier: String,
    pub follower_count: u64,
    pub following_count: u64,
    pub activity_count: u64,
}

/// Column names of the export, in field order
pub const RECORD_HEADERS: [&str; 18] = [
    "sequence",
    "comment_id",
    "parent_comment_id",
    "author_id",
    "created_at",
    "author_name",
    "gender",
    "text",
    "like_count",
    "reply_count",
    "fan_badge",
    "source_location",
    "author_bio",
    "verified",
    "membership_tier",
    "follower_count",
    "following_count",
    "activity_count",
];

impl NormalizedRecord {
    /// Returns true if this record is a reply to another record
    pub fn is_reply(&self) -> bool {
        !self.parent_id.is_empty()
    }

    /// Returns the record as CSV cells in column order
    pub fn to_fields(&self) -> [String; 18] {
        [
            self.sequence.to_string(),
            self.comment_id.clone(),
            self.parent_id.clone(),
            self.author_id.clone(),
            self.created_at.clone(),
            self.author_name.clone(),
            self.gender.clone(),
            self.text.clone(),
            self.like_count.to_string(),
            self.reply_count.to_string(),
            self.fan_badge.clone(),
            self.source_tag.clone(),
            self.author_bio.clone(),
            self.verified.clone(),
            self.membership_tier.clone(),
            self.follower_count.to_string(),
            self.following_count.to_string(),
            self.activity_count.to_string(),
        ]
    }
}
