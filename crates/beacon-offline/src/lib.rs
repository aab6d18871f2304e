//! Offline retry subsystem for the Beacon SDK.
//!
//! This crate provides:
//! - OfflineStore: durable, bounded, FIFO queue of undelivered notifications
//!   backed by a single file
//! - RetryScheduler: periodic and on-demand drain loop over an injected
//!   send capability
//! - BackoffPolicy: capped exponential delay schedule for reconnection
//!
//! Nothing in this crate propagates errors to the producer: load failures
//! degrade to an empty queue and save failures are logged and dropped, so a
//! broken queue file can never disrupt the caller's business logic.

mod backoff;
mod error;
mod paths;
mod retry;
mod store;

pub use backoff::BackoffPolicy;
pub use error::{DeliveryError, OfflineError, OfflineResult};
pub use paths::default_queue_file;
pub use retry::{DeliverNotification, RetryConfig, RetryScheduler};
pub use store::{OfflineStore, QueuedItem, DEFAULT_MAX_SIZE};
