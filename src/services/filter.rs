use tracing::{debug, warn};

use crate::domain::{FeedItem, Watermark};
use crate::errors::FeederResult;

pub const MAX_MEDIA_SIZE: i64 = 3 * 1024 * 1024;

/// Pick the items worth announcing from a newest-first page.
///
/// The result is ordered oldest first. Items with an unreadable date are
/// skipped on their own; everything else is kept only when it is strictly newer
/// than `watermark`, its media fits in [`MAX_MEDIA_SIZE`] and its votes are not
/// negative.
pub fn select_new_items(items: &[FeedItem], watermark: Watermark) -> Vec<&FeedItem> {
    items
        .iter()
        .rev()
        .filter(|item| {
            let published = match item.published_timestamp() {
                Ok(ts) => ts,
                Err(e) => {
                    warn!(id = item.id, error = %e, "skipping item with unreadable date");
                    return false;
                }
            };

            let eligible = watermark.is_before(published)
                && item.media_size <= MAX_MEDIA_SIZE
                && item.votes >= 0;

            if !eligible {
                debug!(
                    id = item.id,
                    published,
                    size = item.media_size,
                    votes = item.votes,
                    "skip"
                );
            }

            eligible
        })
        .collect()
}

/// Timestamp of the first (newest) item, or `None` for an empty page
pub fn newest_timestamp(items: &[FeedItem]) -> Option<FeederResult<i64>> {
    items.first().map(FeedItem::published_timestamp)
}
