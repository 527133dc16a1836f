use serde::Serialize;

use super::FeedItem;

/// A single Slack attachment announcing one feed item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationMessage {
    pub fallback: String,
    pub text: String,
    pub image_url: String,
    pub footer: String,
}

impl NotificationMessage {
    pub fn from_item(item: &FeedItem) -> Self {
        Self {
            fallback: item.description.clone(),
            text: item.description.clone(),
            image_url: item.media_url.clone(),
            footer: item.permalink(),
        }
    }

    /// One-line rendering for logs and dry runs
    pub fn format(&self) -> String {
        let mut line = self.text.clone();

        if !self.image_url.is_empty() {
            line.push(' ');
            line.push_str(&self.image_url);
        }

        line.push_str(" (");
        line.push_str(&self.footer);
        line.push(')');

        line
    }
}

/// Request body for an incoming-webhook post.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub attachments: [&'a NotificationMessage; 1],
    #[serde(skip_serializing_if = "str::is_empty")]
    pub channel: &'a str,
}

impl<'a> WebhookPayload<'a> {
    pub fn new(message: &'a NotificationMessage, channel: &'a str) -> Self {
        Self {
            attachments: [message],
            channel,
        }
    }
}
