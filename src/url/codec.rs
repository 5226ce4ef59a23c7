//! Base-62 post identifier codec
//!
//! Weibo shortens its numeric post and comment ids into a compact
//! alphanumeric token. The id is split into 7-digit decimal groups from the
//! right and each group is written as (up to) four base-62 characters.

use crate::{UrlError, UrlResult};

/// Base-62 alphabet: digits, then lowercase, then uppercase
const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Characters per token chunk
const TOKEN_CHUNK: usize = 4;

/// Decimal digits per id group
const DECIMAL_GROUP: usize = 7;

fn digit_index(c: char) -> Option<u64> {
    match c {
        '0'..='9' => Some(c as u64 - '0' as u64),
        'a'..='z' => Some(c as u64 - 'a' as u64 + 10),
        'A'..='Z' => Some(c as u64 - 'A' as u64 + 36),
        _ => None,
    }
}

fn invalid(token: &str, reason: impl Into<String>) -> UrlError {
    UrlError::InvalidToken {
        token: token.to_string(),
        reason: reason.into(),
    }
}

/// Decodes a base-62 numeral over `[0-9a-zA-Z]`
///
/// # Examples
///
/// ```
/// use weibo_comment_crawler::url::decode_base62;
///
/// assert_eq!(decode_base62("10").unwrap(), 62);
/// assert_eq!(decode_base62("Z").unwrap(), 61);
/// ```
pub fn decode_base62(segment: &str) -> UrlResult<u64> {
    if segment.is_empty() {
        return Err(invalid(segment, "empty segment"));
    }

    segment.chars().try_fold(0u64, |value, c| {
        let digit =
            digit_index(c).ok_or_else(|| invalid(segment, format!("character '{}' is not base-62", c)))?;
        value
            .checked_mul(62)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| invalid(segment, "value overflows 64 bits"))
    })
}

/// Encodes a number as a base-62 numeral (no padding)
fn encode_base62(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// Derives the numeric id behind a post token
///
/// The token is cut into 4-character chunks starting from the right end,
/// each chunk is decoded from base-62, every chunk except the leftmost is
/// zero-padded to 7 decimal digits, and the concatenation is read as one
/// base-10 number.
///
/// # Examples
///
/// ```
/// use weibo_comment_crawler::url::derive_id;
///
/// // "1" | "0001" -> "1" + "0000001"
/// assert_eq!(derive_id("10001").unwrap(), 10_000_001);
/// ```
pub fn derive_id(token: &str) -> UrlResult<u64> {
    let chars: Vec<char> = token.chars().collect();
    if chars.is_empty() {
        return Err(invalid(token, "empty token"));
    }

    let mut digits = String::new();
    let mut end = chars.len();
    while end > 0 {
        let start = end.saturating_sub(TOKEN_CHUNK);
        let chunk: String = chars[start..end].iter().collect();
        let value = decode_base62(&chunk).map_err(|_| invalid(token, format!("bad chunk '{}'", chunk)))?;

        let group = if start > 0 {
            format!("{:0>width$}", value, width = DECIMAL_GROUP)
        } else {
            value.to_string()
        };
        digits.insert_str(0, &group);
        end = start;
    }

    digits
        .parse::<u64>()
        .map_err(|e| invalid(token, format!("decoded digits '{}': {}", digits, e)))
}

/// Encodes a numeric id into the site's token form
///
/// This is the inverse of [`derive_id`]: 7-digit decimal groups from the
/// right, each written in base-62, all but the leftmost left-padded with `0`
/// to four characters.
///
/// # Examples
///
/// ```
/// use weibo_comment_crawler::url::{derive_id, encode_id};
///
/// let token = encode_id(4_512_345_678_901_234);
/// assert_eq!(derive_id(&token).unwrap(), 4_512_345_678_901_234);
/// ```
pub fn encode_id(id: u64) -> String {
    let digits = id.to_string();
    let bytes = digits.as_bytes();

    let mut token = String::new();
    let mut end = bytes.len();
    while end > 0 {
        let start = end.saturating_sub(DECIMAL_GROUP);
        let group: u64 = digits[start..end].parse().unwrap_or(0);
        let encoded = encode_base62(group);

        let chunk = if start > 0 {
            format!("{:0>width$}", encoded, width = TOKEN_CHUNK)
        } else {
            encoded
        };
        token.insert_str(0, &chunk);
        end = start;
    }

    token
}
