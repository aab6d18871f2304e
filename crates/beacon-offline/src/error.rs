//! Offline queue error types.

use thiserror::Error;

/// Errors raised by the queue's internal load/save plumbing.
///
/// These never cross the crate's public surface: a load failure degrades to
/// an empty queue and a save failure is logged and dropped.
#[derive(Error, Debug)]
pub enum OfflineError {
    /// I/O error reading or writing the queue file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Queue file contents could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using OfflineError.
pub type OfflineResult<T> = Result<T, OfflineError>;

/// Failure reported by a send capability for one delivery attempt.
///
/// The drain loop treats every variant identically: the item stays queued
/// for the next pass.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// The request never reached the server or the response was unreadable
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered but did not accept the notification
    #[error("rejected by server: {0}")]
    Rejected(String),
}
