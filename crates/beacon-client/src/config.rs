//! Client configuration.

use crate::ClientResult;
use beacon_offline::{default_queue_file, BackoffPolicy, RetryConfig, DEFAULT_MAX_SIZE};
use beacon_stream::StreamConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default Beacon API URL.
pub const DEFAULT_API_URL: &str = "https://api.beacon.dev";

/// Default Beacon stream URL.
pub const DEFAULT_STREAM_URL: &str = "wss://stream.beacon.dev";

/// Main client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Beacon API base URL.
    pub api_url: String,
    /// Beacon stream endpoint URL.
    pub stream_url: String,
    /// API key for authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of queued notifications.
    pub queue_max_size: usize,
    /// Queue file override; platform default location when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_file: Option<PathBuf>,
    /// Delay before the first drain pass, in seconds.
    pub drain_initial_delay_secs: u64,
    /// Interval between drain passes, in seconds.
    pub drain_period_secs: u64,
    /// Maximum reconnect delay for the stream, in seconds.
    pub reconnect_cap_secs: u64,
    /// Maximum stream reconnect attempts.
    pub max_reconnect_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            stream_url: DEFAULT_STREAM_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
            queue_max_size: DEFAULT_MAX_SIZE,
            queue_file: None,
            drain_initial_delay_secs: 30,
            drain_period_secs: 60,
            reconnect_cap_secs: 30,
            max_reconnect_attempts: 10,
        }
    }
}

impl ClientConfig {
    /// Create a config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from a JSON file, then apply env overrides.
    pub fn load_from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ClientConfig = serde_json::from_str(&content)?;
        config.load_from_env();
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(api_url) = std::env::var("BEACON_API_URL") {
            self.api_url = api_url;
        }
        if let Ok(stream_url) = std::env::var("BEACON_STREAM_URL") {
            self.stream_url = stream_url;
        }
        if let Ok(api_key) = std::env::var("BEACON_API_KEY") {
            self.api_key = Some(api_key);
        }
    }

    /// Get the API URL as a parsed URL.
    pub fn api_url(&self) -> ClientResult<Url> {
        Url::parse(&self.api_url).map_err(Into::into)
    }

    /// Queue file path: the override when set, the platform default
    /// otherwise.
    pub fn queue_file(&self) -> PathBuf {
        self.queue_file.clone().unwrap_or_else(default_queue_file)
    }

    /// Drain timer settings for the retry scheduler.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            initial_delay_secs: self.drain_initial_delay_secs,
            period_secs: self.drain_period_secs,
        }
    }

    /// Reconnect backoff policy for the stream.
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.reconnect_cap_secs, self.max_reconnect_attempts)
    }

    /// Stream client settings.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            url: self.stream_url.clone(),
            backoff: self.backoff(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.stream_url, DEFAULT_STREAM_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.queue_max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.drain_initial_delay_secs, 30);
        assert_eq!(config.drain_period_secs, 60);
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_url": "https://api.example.com"}"#).unwrap();

        let config = ClientConfig::load_from_file(&path).unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        // Unspecified fields fall back to defaults.
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.queue_max_size, DEFAULT_MAX_SIZE);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ClientConfig::default();
        config.api_key = Some("key-123".to_string());
        config.queue_max_size = 7;
        config.save(&path).unwrap();

        let loaded = ClientConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("key-123"));
        assert_eq!(loaded.queue_max_size, 7);
    }

    #[test]
    fn test_api_url_parse() {
        let config = ClientConfig::default();
        let url = config.api_url().unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn test_invalid_api_url() {
        let mut config = ClientConfig::default();
        config.api_url = "not a url".to_string();
        assert!(config.api_url().is_err());
    }

    #[test]
    fn test_queue_file_override() {
        let mut config = ClientConfig::default();
        assert!(config.queue_file().ends_with("queue.json"));

        config.queue_file = Some(PathBuf::from("/tmp/custom-queue.json"));
        assert_eq!(config.queue_file(), PathBuf::from("/tmp/custom-queue.json"));
    }

    #[test]
    fn test_derived_configs() {
        let mut config = ClientConfig::default();
        config.reconnect_cap_secs = 60;
        config.max_reconnect_attempts = 5;
        config.drain_initial_delay_secs = 5;

        let retry = config.retry_config();
        assert_eq!(retry.initial_delay_secs, 5);
        assert_eq!(retry.period_secs, 60);

        let backoff = config.backoff();
        assert_eq!(backoff.max_attempts(), 5);
        assert_eq!(
            backoff.delay(0),
            Some(std::time::Duration::from_secs(1))
        );

        let stream = config.stream_config();
        assert_eq!(stream.url, DEFAULT_STREAM_URL);
        assert_eq!(stream.backoff, backoff);
    }
}
