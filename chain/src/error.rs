use pricing::PricingError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("contract store lock poisoned")]
    Poisoned,
    #[error("invalid option record: {0}")]
    InvalidRecord(String),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChainError>;
