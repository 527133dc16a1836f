pub mod feed_item;
pub mod notification;
pub mod watermark;

pub use feed_item::{format_published, parse_published, FeedItem, FeedPage};
pub use notification::{NotificationMessage, WebhookPayload};
pub use watermark::Watermark;
