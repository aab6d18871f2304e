//! HTTP delivery of notifications to the Beacon API.

use crate::{ClientConfig, ClientResult};
use beacon_offline::{DeliverNotification, DeliveryError};
use beacon_types::Notification;
use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Response from the notifications endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotifyResponse {
    accepted: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Sends one notification at a time to the Beacon API.
///
/// Reports success only for a 2xx response whose body acknowledges
/// acceptance; any transport, status, or decode fault maps to a
/// [`DeliveryError`].
pub struct HttpSender {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpSender {
    /// Create a sender from the client configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    async fn try_send(&self, request: &Notification) -> Result<(), DeliveryError> {
        let url = format!("{}/v1/notifications", self.api_url);

        debug!(url = %url, event_type = %request.event_type, "Sending notification");

        let mut req = self.client.post(&url).json(request);
        if let Some(api_key) = &self.api_key {
            req = req.bearer_auth(api_key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected(format!("HTTP {}: {}", status, body)));
        }

        let result: NotifyResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if result.accepted {
            Ok(())
        } else {
            Err(DeliveryError::Rejected(
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

impl DeliverNotification for HttpSender {
    fn deliver(&self, request: Notification) -> BoxFuture<'_, Result<(), DeliveryError>> {
        Box::pin(async move { self.try_send(&request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_creation() {
        let config = ClientConfig::default();
        let sender = HttpSender::new(&config).unwrap();
        assert_eq!(sender.api_url, crate::DEFAULT_API_URL);
        assert!(sender.api_key.is_none());
    }

    #[test]
    fn test_response_accepted() {
        let parsed: NotifyResponse =
            serde_json::from_str(r#"{"accepted": true}"#).unwrap();
        assert!(parsed.accepted);
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_response_rejected_with_error() {
        let parsed: NotifyResponse =
            serde_json::from_str(r#"{"accepted": false, "error": "bad payload"}"#).unwrap();
        assert!(!parsed.accepted);
        assert_eq!(parsed.error.as_deref(), Some("bad payload"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_failure() {
        let mut config = ClientConfig::default();
        // Port 9 (discard) is closed; the connection is refused immediately.
        config.api_url = "http://127.0.0.1:9".to_string();
        config.timeout_secs = 2;
        let sender = HttpSender::new(&config).unwrap();

        let request = Notification::builder("test.event")
            .title("t")
            .message("m")
            .build();
        let result = sender.deliver(request).await;
        assert!(matches!(result, Err(DeliveryError::Transport(_))));
    }
}
