use chrono::DateTime;

use crate::errors::{FeederError, FeederResult};

/// Unix timestamp of the newest item already handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Watermark(pub i64);

impl Watermark {
    pub const EPOCH: Watermark = Watermark(0);

    pub fn timestamp(self) -> i64 {
        self.0
    }

    /// Whether an item published at `timestamp` has not been seen yet
    pub fn is_before(self, timestamp: i64) -> bool {
        timestamp > self.0
    }

    /// Lowercase hex, no prefix, no newline
    pub fn encode(self) -> String {
        if self.0 < 0 {
            format!("-{:x}", self.0.unsigned_abs())
        } else {
            format!("{:x}", self.0)
        }
    }

    pub fn decode(raw: &str) -> FeederResult<Self> {
        i64::from_str_radix(raw.trim(), 16)
            .map(Watermark)
            .map_err(|e| FeederError::Persist(format!("invalid watermark {:?}: {}", raw, e)))
    }

    pub fn to_rfc3339(self) -> Option<String> {
        DateTime::from_timestamp(self.0, 0).map(|dt| dt.to_rfc3339())
    }
}

impl std::fmt::Display for Watermark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
