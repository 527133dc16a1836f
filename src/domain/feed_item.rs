use chrono::{DateTime, Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::{FeederError, FeederResult};

/// Layout of the `date` field, minus the trailing AM/PM marker.
const PUBLISHED_FORMAT: &str = "%b %d, %Y %H:%M:%S";
const PERMALINK_BASE: &str = "https://developerslife.ru";

/// One entry of the `result` array.
///
/// The API is not consistent about field casing, so both spellings are accepted.
/// Every field falls back to its default so that one incomplete entry does not
/// reject the whole page; an empty `date` is caught later by the filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedItem {
    #[serde(rename = "ID", alias = "id")]
    pub id: i64,
    #[serde(rename = "Description", alias = "description")]
    pub description: String,
    #[serde(rename = "Votes", alias = "votes")]
    pub votes: i64,
    #[serde(rename = "date")]
    pub published_at: String,
    #[serde(rename = "gifURL")]
    pub media_url: String,
    #[serde(rename = "gifSize")]
    pub media_size: i64,
}

impl FeedItem {
    pub fn new(id: i64, published_at: impl Into<String>) -> Self {
        Self {
            id,
            published_at: published_at.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_votes(mut self, votes: i64) -> Self {
        self.votes = votes;
        self
    }

    pub fn with_media(mut self, url: impl Into<String>, size: i64) -> Self {
        self.media_url = url.into();
        self.media_size = size;
        self
    }

    /// Unix timestamp of `published_at`
    pub fn published_timestamp(&self) -> FeederResult<i64> {
        parse_published(&self.published_at)
    }

    pub fn permalink(&self) -> String {
        format!("{}/{}", PERMALINK_BASE, self.id)
    }
}

/// A decoded feed snapshot, newest entry first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedPage {
    #[serde(rename = "result", alias = "Result", default)]
    pub items: Vec<FeedItem>,
}

/// Parse `"Jan 2, 2006 3:04:05 PM"` (UTC) into Unix seconds.
///
/// The hour may also be written on the 24-hour clock (`15:04:05 PM`); PM only
/// shifts hours below 12 and AM only maps 12 to midnight.
pub fn parse_published(value: &str) -> FeederResult<i64> {
    let invalid = |reason: String| FeederError::DateParse {
        value: value.to_string(),
        reason,
    };

    let (stamp, marker) = value
        .trim()
        .rsplit_once(' ')
        .ok_or_else(|| invalid("missing AM/PM marker".to_string()))?;

    let pm = if marker.eq_ignore_ascii_case("PM") {
        true
    } else if marker.eq_ignore_ascii_case("AM") {
        false
    } else {
        return Err(invalid(format!("unexpected marker {:?}", marker)));
    };

    let naive = NaiveDateTime::parse_from_str(stamp, PUBLISHED_FORMAT)
        .map_err(|e| invalid(e.to_string()))?;

    let naive = match (pm, naive.hour()) {
        (true, hour) if hour < 12 => naive + Duration::hours(12),
        (false, 12) => naive - Duration::hours(12),
        _ => naive,
    };

    Ok(naive.and_utc().timestamp())
}

/// Render a Unix timestamp the way the feed writes it.
pub fn format_published(timestamp: i64) -> Option<String> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%b %-d, %Y %-I:%M:%S %p").to_string())
}
