//! Beacon client SDK.
//!
//! This crate provides:
//! - BeaconClient: direct notification submission with an offline retry
//!   queue as the fallback path
//! - HttpSender: HTTP delivery of one notification to the Beacon API
//! - ClientConfig: configuration with defaults, env overrides, and JSON
//!   file load/save
//!
//! A failed direct send never surfaces to the caller; the notification is
//! queued and the caller is told so via [`DeliveryStatus::Queued`].

mod config;
mod error;
mod notifier;
mod sender;

pub use beacon_offline::{BackoffPolicy, QueuedItem};
pub use beacon_stream::{StreamClient, StreamConfig, StreamEvent};
pub use beacon_types::{Action, Notification, NotificationBuilder, Severity};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_STREAM_URL};
pub use error::{ClientError, ClientResult};
pub use notifier::{BeaconClient, DeliveryStatus};
pub use sender::HttpSender;
