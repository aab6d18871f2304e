//! Stream protocol messages.

use beacon_types::Notification;
use serde::{Deserialize, Serialize};

/// Stream message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamMessageType {
    // Connection
    Auth,
    AuthResult,
    Error,

    // Keepalive
    Heartbeat,

    // Events
    Notification,
}

/// A message sent to/from the stream endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMessage {
    #[serde(rename = "type")]
    pub msg_type: StreamMessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl StreamMessage {
    /// Create a new stream message.
    pub fn new(msg_type: StreamMessageType) -> Self {
        Self {
            msg_type,
            payload: None,
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            error: None,
            success: None,
        }
    }

    /// Create an auth message carrying the API key.
    pub fn auth(api_key: &str) -> Self {
        Self {
            msg_type: StreamMessageType::Auth,
            payload: Some(serde_json::json!({ "apiKey": api_key })),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            error: None,
            success: None,
        }
    }

    /// Create a heartbeat message.
    pub fn heartbeat() -> Self {
        Self::new(StreamMessageType::Heartbeat)
    }

    /// Parse the payload as a notification, for `notification` messages.
    pub fn notification(&self) -> Option<Notification> {
        self.payload
            .as_ref()
            .and_then(|p| serde_json::from_value(p.clone()).ok())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_types::Severity;

    #[test]
    fn test_auth_message_json() {
        let msg = StreamMessage::auth("key-123");
        let json = msg.to_json().unwrap();

        assert!(json.contains("\"type\":\"auth\""));
        assert!(json.contains("\"apiKey\":\"key-123\""));
        assert!(!json.contains("error"));
        assert!(!json.contains("success"));
    }

    #[test]
    fn test_heartbeat_message() {
        let msg = StreamMessage::heartbeat();
        assert_eq!(msg.msg_type, StreamMessageType::Heartbeat);
        assert!(msg.payload.is_none());
        assert!(msg.timestamp.is_some());
    }

    #[test]
    fn test_parse_auth_result() {
        let json = r#"{"type":"authResult","success":true}"#;
        let msg = StreamMessage::from_json(json).unwrap();

        assert_eq!(msg.msg_type, StreamMessageType::AuthResult);
        assert_eq!(msg.success, Some(true));
    }

    #[test]
    fn test_parse_notification_payload() {
        let json = r#"{
            "type": "notification",
            "payload": {
                "eventType": "deploy.finished",
                "severity": "warning",
                "title": "Deploy finished",
                "message": "v2 is live"
            }
        }"#;
        let msg = StreamMessage::from_json(json).unwrap();

        let notification = msg.notification().unwrap();
        assert_eq!(notification.event_type, "deploy.finished");
        assert_eq!(notification.severity, Severity::Warning);
    }

    #[test]
    fn test_notification_accessor_on_bad_payload() {
        let json = r#"{"type":"notification","payload":{"bogus":1}}"#;
        let msg = StreamMessage::from_json(json).unwrap();
        assert!(msg.notification().is_none());
    }

    #[test]
    fn test_parse_error_message() {
        let json = r#"{"type":"error","error":"rate limited"}"#;
        let msg = StreamMessage::from_json(json).unwrap();

        assert_eq!(msg.msg_type, StreamMessageType::Error);
        assert_eq!(msg.error.as_deref(), Some("rate limited"));
    }
}
