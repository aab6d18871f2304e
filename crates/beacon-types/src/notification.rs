//! Notification record and builder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity of a notification event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational event.
    #[default]
    Info,
    /// Something needs attention soon.
    Warning,
    /// Something failed.
    Error,
    /// Something failed and requires immediate action.
    Critical,
}

/// An action a consumer can take on a notification (rendered as a link or
/// button by clients).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Display label.
    pub label: String,
    /// Target URL.
    pub url: String,
}

/// A notification request as accepted by the Beacon API.
///
/// Fields with no value are omitted from the serialized record rather than
/// emitted as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Event type identifier (e.g. "deploy.finished").
    pub event_type: String,
    /// Event severity.
    pub severity: Severity,
    /// Short human-readable title.
    pub title: String,
    /// Longer message body.
    pub message: String,
    /// Optional free-form metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Optional actions attached to the notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
}

impl Notification {
    /// Start building a notification for the given event type.
    pub fn builder(event_type: impl Into<String>) -> NotificationBuilder {
        NotificationBuilder::new(event_type)
    }
}

/// Fluent builder for [`Notification`].
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    event_type: String,
    severity: Severity,
    title: String,
    message: String,
    metadata: Option<BTreeMap<String, String>>,
    actions: Option<Vec<Action>>,
}

impl NotificationBuilder {
    /// Create a builder for the given event type.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            severity: Severity::default(),
            title: String::new(),
            message: String::new(),
            metadata: None,
            actions: None,
        }
    }

    /// Set the severity.
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the message body.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add one metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add one action.
    pub fn action(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.actions.get_or_insert_with(Vec::new).push(Action {
            label: label.into(),
            url: url.into(),
        });
        self
    }

    /// Build the notification.
    pub fn build(self) -> Notification {
        Notification {
            event_type: self.event_type,
            severity: self.severity,
            title: self.title,
            message: self.message,
            metadata: self.metadata,
            actions: self.actions,
        }
    }
}
