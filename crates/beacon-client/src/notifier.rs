//! Client facade: direct send with enqueue-on-failure fallback.

use crate::{ClientConfig, ClientResult, HttpSender};
use beacon_offline::{DeliverNotification, OfflineStore, QueuedItem, RetryScheduler};
use beacon_stream::{StreamClient, StreamEvent};
use beacon_types::Notification;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Outcome of a notification submission, from the caller's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The API accepted the notification.
    Delivered,
    /// Direct delivery failed; the notification is queued for retry.
    Queued,
}

/// Beacon client: submits notifications, falling back to the offline queue
/// when the API is unreachable.
///
/// Submission never returns an error to the caller: a failed direct send
/// degrades to [`DeliveryStatus::Queued`] and the background drain timer
/// takes over. `shutdown` stops the timer and the stream; an in-flight
/// drain pass is not interrupted.
pub struct BeaconClient {
    config: ClientConfig,
    sender: Arc<HttpSender>,
    store: Arc<OfflineStore>,
    scheduler: Arc<RetryScheduler>,
    stream: Arc<StreamClient>,
    drain_task: JoinHandle<()>,
    stream_task: Mutex<Option<JoinHandle<()>>>,
}

impl BeaconClient {
    /// Create a client and start its background drain timer.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let sender = Arc::new(HttpSender::new(&config)?);
        let store = Arc::new(OfflineStore::new(
            config.queue_file(),
            config.queue_max_size,
        ));
        let scheduler = RetryScheduler::new(store.clone(), sender.clone());
        let drain_task = scheduler.clone().spawn(config.retry_config());
        let stream = Arc::new(StreamClient::new(config.stream_config()));

        info!(
            api_url = %config.api_url,
            queue_file = %store.path().display(),
            "Beacon client ready"
        );

        Ok(Self {
            config,
            sender,
            store,
            scheduler,
            stream,
            drain_task,
            stream_task: Mutex::new(None),
        })
    }

    /// Submit one notification.
    ///
    /// Attempts a direct send first; on any failure the notification is
    /// enqueued for background retry and the caller is told `Queued`.
    pub async fn notify(&self, request: Notification) -> DeliveryStatus {
        match self.sender.deliver(request.clone()).await {
            Ok(()) => {
                debug!(event_type = %request.event_type, "Notification delivered");
                DeliveryStatus::Delivered
            }
            Err(e) => {
                info!(
                    event_type = %request.event_type,
                    error = %e,
                    "Direct send failed, queueing for retry"
                );
                self.store.enqueue(request).await;
                DeliveryStatus::Queued
            }
        }
    }

    /// Queue one notification without attempting a direct send.
    ///
    /// Fire-and-forget: the background drain timer delivers it later.
    pub async fn enqueue(&self, request: Notification) {
        self.store.enqueue(request).await;
    }

    /// Trigger an immediate drain pass.
    ///
    /// Returns the number of queued notifications delivered; 0 when the
    /// queue was empty or a drain was already running.
    pub async fn retry_now(&self) -> usize {
        self.scheduler.drain().await
    }

    /// Current queue contents, oldest first.
    pub async fn queued(&self) -> Vec<QueuedItem> {
        self.store.list().await
    }

    /// Current queue size.
    pub async fn queued_count(&self) -> usize {
        self.store.count().await
    }

    /// Discard all queued notifications.
    pub async fn clear_queue(&self) {
        self.store.clear().await;
    }

    /// Consecutive drain passes that ended with items still queued.
    pub fn failure_streak(&self) -> u32 {
        self.scheduler.failure_streak()
    }

    /// Subscribe to live stream events.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.stream.subscribe()
    }

    /// Open the live stream connection in the background.
    ///
    /// The stream authenticates with the configured API key and reconnects
    /// on its own after unplanned disconnects.
    pub fn connect_stream(&self) {
        let stream = Arc::clone(&self.stream);
        let api_key = self.config.api_key.clone().unwrap_or_default();
        let handle = tokio::spawn(async move {
            if let Err(e) = stream.connect(&api_key).await {
                warn!(error = %e, "Stream connection ended with error");
            }
        });

        let mut stream_task = self.stream_task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = stream_task.replace(handle) {
            previous.abort();
        }
    }

    /// Stop the background drain timer and close the stream.
    ///
    /// An in-flight drain pass or file write is not forcibly interrupted.
    pub async fn shutdown(&self) {
        self.drain_task.abort();
        self.stream.disconnect().await;
        let handle = self
            .stream_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        info!("Beacon client shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_config(dir: &tempfile::TempDir) -> ClientConfig {
        let mut config = ClientConfig::default();
        // Port 9 (discard) refuses connections, so every direct send fails.
        config.api_url = "http://127.0.0.1:9".to_string();
        config.timeout_secs = 2;
        config.queue_file = Some(dir.path().join("queue.json"));
        config.queue_max_size = 10;
        // Keep the background timer out of the way during tests.
        config.drain_initial_delay_secs = 3600;
        config
    }

    fn note(tag: &str) -> Notification {
        Notification::builder("test.event")
            .title(tag)
            .message("test message")
            .build()
    }

    #[tokio::test]
    async fn test_new_client_has_empty_queue() {
        let dir = tempdir().unwrap();
        let client = BeaconClient::new(test_config(&dir)).unwrap();

        assert_eq!(client.queued_count().await, 0);
        assert!(client.queued().await.is_empty());
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_notify_queues_on_unreachable_endpoint() {
        let dir = tempdir().unwrap();
        let client = BeaconClient::new(test_config(&dir)).unwrap();

        let status = client.notify(note("a")).await;
        assert_eq!(status, DeliveryStatus::Queued);
        assert_eq!(client.queued_count().await, 1);

        let queued = client.queued().await;
        assert_eq!(queued[0].request.title, "a");
        assert_eq!(queued[0].retry_count, 0);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_retry_now_keeps_failing_items() {
        let dir = tempdir().unwrap();
        let client = BeaconClient::new(test_config(&dir)).unwrap();

        client.notify(note("a")).await;
        client.notify(note("b")).await;

        assert_eq!(client.retry_now().await, 0);
        assert_eq!(client.queued_count().await, 2);
        assert_eq!(client.failure_streak(), 1);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_enqueue_skips_direct_send() {
        let dir = tempdir().unwrap();
        let client = BeaconClient::new(test_config(&dir)).unwrap();

        client.enqueue(note("a")).await;
        client.enqueue(note("b")).await;

        let queued = client.queued().await;
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[0].request.title, "a");
        assert_eq!(queued[1].request.title, "b");
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_clear_queue() {
        let dir = tempdir().unwrap();
        let client = BeaconClient::new(test_config(&dir)).unwrap();

        client.notify(note("a")).await;
        client.clear_queue().await;
        assert_eq!(client.queued_count().await, 0);
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_queue_survives_client_restart() {
        let dir = tempdir().unwrap();

        let client = BeaconClient::new(test_config(&dir)).unwrap();
        client.notify(note("a")).await;
        client.shutdown().await;
        drop(client);

        let client = BeaconClient::new(test_config(&dir)).unwrap();
        let queued = client.queued().await;
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].request.title, "a");
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_subscribe_before_stream_connect() {
        let dir = tempdir().unwrap();
        let client = BeaconClient::new(test_config(&dir)).unwrap();

        let _events = client.subscribe();
        client.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let dir = tempdir().unwrap();
        let client = BeaconClient::new(test_config(&dir)).unwrap();

        client.shutdown().await;
        client.shutdown().await;
    }
}
