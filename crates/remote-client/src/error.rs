use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to a remote service.
///
/// Weather and mood adapters never surface these: they log them and
/// degrade to a fallback value. Only `TextGenerator` returns them, and the
/// recommendation engine absorbs them.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Location unavailable: {0}")]
    Location(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl RemoteError {
    /// Build a `Status` error from a non-success response, consuming its body.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        RemoteError::Status { status, body }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RemoteError>;
