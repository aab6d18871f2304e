//! Wire-level notification types for the Beacon SDK.
//!
//! This crate provides:
//! - Notification: the event record sent to the Beacon API
//! - NotificationBuilder: fluent construction of notification requests
//! - Severity and Action: supporting field types

mod notification;

pub use notification::{Action, Notification, NotificationBuilder, Severity};
