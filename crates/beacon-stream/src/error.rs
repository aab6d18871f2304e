//! Stream error types.

use thiserror::Error;

/// Stream error type.
#[derive(Error, Debug)]
pub enum StreamError {
    /// WebSocket transport error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),
}

/// Result type alias using StreamError.
pub type StreamResult<T> = Result<T, StreamError>;
