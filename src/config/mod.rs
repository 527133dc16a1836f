use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::errors::{FeederError, FeederResult};

pub const DEFAULT_FEED_URL: &str = "https://developerslife.ru/latest/0?json=true";
pub const DEFAULT_POLL_MINUTES: u64 = 2;
const WATERMARK_FILE: &str = "devlife.id";

#[derive(Debug, Clone)]
pub struct Config {
    pub webhook_url: String,
    pub channel: String,
    pub feed_url: String,
    pub watermark_path: PathBuf,
    pub poll_interval: Duration,
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    pub fn new(webhook_url: &str, channel: &str) -> FeederResult<Self> {
        validate_url("webhook", webhook_url)?;

        Ok(Self {
            webhook_url: webhook_url.to_string(),
            channel: channel.to_string(),
            feed_url: DEFAULT_FEED_URL.to_string(),
            watermark_path: default_watermark_path(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_MINUTES * 60),
        })
    }

    /// Load `.env` files into the process environment
    fn load_dotenv() {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();
    }

    /// Watermark location alone, for commands that never talk to Slack
    pub fn watermark_path_from_env() -> PathBuf {
        Self::load_dotenv();

        std::env::var("DEVLIFE_WATERMARK_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_watermark_path())
    }

    pub fn from_env() -> FeederResult<Self> {
        Self::load_dotenv();

        let channel = required_var("SLACK_CHAN")?;
        let webhook_url = required_var("SLACK_WEBHOOK_URL")?;

        let mut config = Self::new(&webhook_url, &channel)?;

        if let Ok(feed_url) = std::env::var("DEVLIFE_FEED_URL") {
            config = config.with_feed_url(&feed_url)?;
        }

        Ok(config.with_watermark_path(Self::watermark_path_from_env()))
    }

    pub fn with_feed_url(mut self, feed_url: &str) -> FeederResult<Self> {
        validate_url("feed", feed_url)?;
        self.feed_url = feed_url.to_string();
        Ok(self)
    }

    pub fn with_watermark_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.watermark_path = path.into();
        self
    }

    pub fn with_poll_interval(mut self, minutes: u64) -> FeederResult<Self> {
        if minutes == 0 {
            return Err(FeederError::Config(
                "poll interval must be at least one minute".to_string(),
            ));
        }
        let secs = minutes.checked_mul(60).ok_or_else(|| {
            FeederError::Config(format!("poll interval of {} minutes is too large", minutes))
        })?;
        self.poll_interval = Duration::from_secs(secs);
        Ok(self)
    }
}

fn required_var(name: &str) -> FeederResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(FeederError::MissingEnvVar(name.to_string())),
    }
}

fn validate_url(kind: &str, value: &str) -> FeederResult<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| FeederError::Config(format!("invalid {} URL {:?}: {}", kind, value, e)))
}

fn default_watermark_path() -> PathBuf {
    std::env::temp_dir().join(WATERMARK_FILE)
}
