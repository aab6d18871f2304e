//! Live notification stream for the Beacon SDK.
//!
//! This crate provides:
//! - WebSocket connection to the Beacon stream endpoint
//! - Automatic reconnection paced by the shared backoff policy
//! - Broadcast delivery of incoming notifications to subscribers
//! - Heartbeat for connection keepalive

mod client;
mod error;
mod messages;

pub use client::{ConnectionState, StreamClient, StreamConfig, StreamEvent};
pub use error::{StreamError, StreamResult};
pub use messages::{StreamMessage, StreamMessageType};
