use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::domain::FeedPage;
use crate::errors::{FeederError, FeederResult};
use crate::sources::traits::FeedSource;

const USER_AGENT: &str = concat!("devlife-feeder/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DevLifeSource {
    client: Client,
    url: String,
}

impl DevLifeSource {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.to_string(),
        }
    }
}

impl FeedSource for DevLifeSource {
    fn fetch(&self) -> FeederResult<Vec<u8>> {
        debug!(url = %self.url, "fetching feed");

        let response = self.client.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeederError::Fetch(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Decode a feed snapshot, keeping the order the server sent
pub fn decode_page(bytes: &[u8]) -> FeederResult<FeedPage> {
    Ok(serde_json::from_slice(bytes)?)
}
