use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeederError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Network errors
    #[error("Feed fetch failed: {0}")]
    Fetch(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("Feed decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid date {value:?}: {reason}")]
    DateParse { value: String, reason: String },

    // Storage errors
    #[error("Watermark persistence failed: {0}")]
    Persist(String),

    // Notification errors
    #[error("Delivery failed: {0}")]
    Delivery(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FeederResult<T> = Result<T, FeederError>;
