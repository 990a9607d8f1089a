use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single chat exchange.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("chat endpoint returned {0}")]
    Status(StatusCode),
    #[error("response stream failed: {0}")]
    Body(String),
}
