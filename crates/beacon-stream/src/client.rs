//! WebSocket stream client.

use crate::{StreamError, StreamMessage, StreamMessageType, StreamResult};
use beacon_offline::BackoffPolicy;
use beacon_types::Notification;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::time::{interval, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Stream client configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Stream endpoint URL (e.g. wss://stream.beacon.dev).
    pub url: String,
    /// Heartbeat interval in seconds.
    pub heartbeat_interval_secs: u64,
    /// Backoff policy pacing reconnection after an unplanned disconnect.
    pub backoff: BackoffPolicy,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: "wss://stream.beacon.dev".to_string(),
            heartbeat_interval_secs: 30,
            backoff: BackoffPolicy::default(),
        }
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Authenticating,
    Connected,
}

/// Events emitted by the stream client.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Connected and authenticated.
    Connected,
    /// Disconnected from the stream.
    Disconnected(Option<String>),
    /// Authentication failed.
    AuthenticationFailed(String),
    /// Received a notification.
    Notification(Notification),
    /// Error reported by the server.
    Error(String),
}

/// WebSocket stream client with automatic reconnection.
///
/// Reconnection after an unplanned disconnect is paced by the shared
/// [`BackoffPolicy`]; the attempt counter resets on successful
/// authentication and reconnection stops once the policy gives up.
pub struct StreamClient {
    config: StreamConfig,
    state: Arc<RwLock<ConnectionState>>,
    sender: Arc<Mutex<Option<mpsc::Sender<Message>>>>,
    event_tx: broadcast::Sender<StreamEvent>,
    api_key: Arc<RwLock<Option<String>>>,
    reconnect_attempts: Arc<RwLock<u32>>,
}

impl StreamClient {
    /// Create a new stream client with the given configuration.
    pub fn new(config: StreamConfig) -> Self {
        let (event_tx, _) = broadcast::channel(100);

        Self {
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            sender: Arc::new(Mutex::new(None)),
            event_tx,
            api_key: Arc::new(RwLock::new(None)),
            reconnect_attempts: Arc::new(RwLock::new(0)),
        }
    }

    /// Create with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(StreamConfig::default())
    }

    /// Subscribe to stream events.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current connection state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Check if connected.
    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Connected
    }

    /// Connect to the stream endpoint and run until the connection closes.
    ///
    /// Stores the API key for reconnection; returns once the connection
    /// (and any subsequent reconnect sequence) has terminated.
    pub async fn connect(&self, api_key: &str) -> StreamResult<()> {
        let current_state = *self.state.read().await;
        if current_state != ConnectionState::Disconnected {
            debug!("Already connecting or connected");
            return Ok(());
        }

        *self.api_key.write().await = Some(api_key.to_string());

        self.do_connect().await
    }

    /// Internal connect implementation.
    async fn do_connect(&self) -> StreamResult<()> {
        *self.state.write().await = ConnectionState::Connecting;
        info!(url = %self.config.url, "Connecting to stream");

        let (ws_stream, _) = connect_async(&self.config.url).await?;
        let (mut write, mut read) = ws_stream.split();

        let (msg_tx, mut msg_rx) = mpsc::channel::<Message>(100);
        *self.sender.lock().await = Some(msg_tx.clone());

        *self.state.write().await = ConnectionState::Authenticating;

        let api_key = self
            .api_key
            .read()
            .await
            .clone()
            .ok_or_else(|| StreamError::Authentication("No API key".to_string()))?;

        let auth_msg = StreamMessage::auth(&api_key);
        let auth_json = auth_msg.to_json()?;
        write.send(Message::Text(auth_json.into())).await?;
        debug!("Sent auth message");

        // Spawn message sender task
        let sender_handle = tokio::spawn(async move {
            while let Some(msg) = msg_rx.recv().await {
                if write.send(msg).await.is_err() {
                    break;
                }
            }
        });

        // Spawn heartbeat task
        let heartbeat_sender = msg_tx.clone();
        let heartbeat_interval = self.config.heartbeat_interval_secs;
        let heartbeat_handle = tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(heartbeat_interval));
            loop {
                interval.tick().await;
                let heartbeat = StreamMessage::heartbeat();
                if let Ok(json) = heartbeat.to_json() {
                    if heartbeat_sender
                        .send(Message::Text(json.into()))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }
        });

        // Process incoming messages
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match StreamMessage::from_json(&text) {
                    Ok(stream_msg) => {
                        self.handle_message(&stream_msg).await;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to parse stream message");
                    }
                },
                Ok(Message::Close(_)) => {
                    info!("Stream connection closed");
                    break;
                }
                Ok(Message::Ping(data)) => {
                    if let Some(sender) = self.sender.lock().await.as_ref() {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    break;
                }
            }
        }

        // Cleanup
        heartbeat_handle.abort();
        sender_handle.abort();
        *self.sender.lock().await = None;
        *self.state.write().await = ConnectionState::Disconnected;

        let _ = self.event_tx.send(StreamEvent::Disconnected(None));

        // Attempt reconnection
        self.schedule_reconnect().await;

        Ok(())
    }

    /// Handle incoming stream message.
    async fn handle_message(&self, msg: &StreamMessage) {
        match msg.msg_type {
            StreamMessageType::AuthResult => {
                if msg.success == Some(true) {
                    *self.state.write().await = ConnectionState::Connected;
                    *self.reconnect_attempts.write().await = 0;
                    info!("Authenticated with stream");
                    let _ = self.event_tx.send(StreamEvent::Connected);
                } else {
                    let error = msg
                        .error
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string());
                    *self.state.write().await = ConnectionState::Disconnected;
                    error!(error = %error, "Stream authentication failed");
                    let _ = self
                        .event_tx
                        .send(StreamEvent::AuthenticationFailed(error));
                }
            }
            StreamMessageType::Notification => match msg.notification() {
                Some(notification) => {
                    debug!(event_type = %notification.event_type, "Received notification");
                    let _ = self.event_tx.send(StreamEvent::Notification(notification));
                }
                None => {
                    warn!("Notification message with unparseable payload");
                }
            },
            StreamMessageType::Error => {
                let error = msg
                    .error
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string());
                warn!(error = %error, "Stream error");
                let _ = self.event_tx.send(StreamEvent::Error(error));
            }
            _ => {
                debug!(msg_type = ?msg.msg_type, "Ignoring message");
            }
        }
    }

    /// Schedule automatic reconnection.
    async fn schedule_reconnect(&self) {
        let mut attempts = self.reconnect_attempts.write().await;
        let attempt = *attempts;
        *attempts += 1;

        let delay = match self.config.backoff.delay(attempt) {
            Some(delay) => delay,
            None => {
                warn!(attempts = attempt, "Reconnect attempts exhausted, giving up");
                let _ = self.event_tx.send(StreamEvent::Disconnected(Some(
                    "reconnect attempts exhausted".to_string(),
                )));
                return;
            }
        };

        info!(
            attempt = attempt,
            delay_secs = delay.as_secs(),
            "Scheduling reconnect"
        );

        drop(attempts);

        tokio::time::sleep(delay).await;

        if self.api_key.read().await.is_some() {
            if let Err(e) = Box::pin(self.do_connect()).await {
                error!(error = %e, "Reconnect attempt failed");
                Box::pin(self.schedule_reconnect()).await;
            }
        }
    }

    /// Disconnect from the stream and suppress reconnection.
    pub async fn disconnect(&self) {
        *self.reconnect_attempts.write().await = self.config.backoff.max_attempts();

        if let Some(sender) = self.sender.lock().await.take() {
            drop(sender);
        }

        *self.state.write().await = ConnectionState::Disconnected;
        *self.api_key.write().await = None;

        info!("Disconnected from stream");
        let _ = self
            .event_tx
            .send(StreamEvent::Disconnected(Some("client disconnected".to_string())));
    }
}
