use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};

use crate::config::Config;
use crate::domain::{NotificationMessage, WebhookPayload};
use crate::errors::{FeederError, FeederResult};

/// Body the webhook answers with on success
const WEBHOOK_OK: &str = "ok";

#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn send(&self, message: &NotificationMessage) -> FeederResult<()>;
}

/// Posts attachments to a Slack incoming webhook.
pub struct NotificationService {
    client: Client,
    webhook_url: String,
    channel: String,
}

impl NotificationService {
    pub fn new(config: &Config) -> FeederResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
            channel: config.channel.clone(),
        })
    }
}

impl Notifier for NotificationService {
    fn send(&self, message: &NotificationMessage) -> FeederResult<()> {
        let payload = WebhookPayload::new(message, &self.channel);
        let body = serde_json::to_vec(&payload)
            .map_err(|e| FeederError::Delivery(format!("cannot encode payload: {}", e)))?;

        let response = self
            .client
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .map_err(|e| FeederError::Delivery(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| FeederError::Delivery(e.to_string()))?;

        if text != WEBHOOK_OK {
            return Err(FeederError::Delivery(format!(
                "webhook answered {} {:?}",
                status, text
            )));
        }

        Ok(())
    }
}
