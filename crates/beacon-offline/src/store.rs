//! File-backed bounded FIFO queue for undelivered notifications.

use crate::OfflineResult;
use beacon_types::Notification;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default bound on the number of queued notifications.
pub const DEFAULT_MAX_SIZE: usize = 100;

/// One pending notification with its queueing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedItem {
    /// When the item was enqueued.
    pub queued_at: DateTime<Utc>,
    /// Delivery attempts so far. Persisted for file-format compatibility;
    /// the drain loop does not increment it.
    pub retry_count: u32,
    /// The notification to deliver, opaque to the queue.
    pub request: Notification,
}

impl QueuedItem {
    /// Wrap a notification for queueing, stamped with the current time.
    pub fn new(request: Notification) -> Self {
        Self {
            queued_at: Utc::now(),
            retry_count: 0,
            request,
        }
    }
}

/// Durable, bounded, FIFO holding area for notifications pending delivery.
///
/// All state lives in one JSON file. Every load/mutate/save cycle runs
/// under one store-scoped lock, so no two store operations interleave their
/// file accesses. The read-modify-write is NOT crash-atomic: a process
/// failure between load and save can lose that cycle's contents. That is an
/// accepted weak-durability tradeoff of this queue, not something to patch
/// with atomic renames.
pub struct OfflineStore {
    path: PathBuf,
    max_size: usize,
    lock: Mutex<()>,
}

impl OfflineStore {
    /// Create a store backed by the given file.
    ///
    /// The file is not created until the first save; a missing file reads
    /// as an empty queue.
    pub fn new(path: impl Into<PathBuf>, max_size: usize) -> Self {
        Self {
            path: path.into(),
            max_size,
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maximum number of items retained.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Append one notification, evicting the oldest items when the bound
    /// is exceeded. Never fails visibly to the caller.
    pub async fn enqueue(&self, request: Notification) {
        let _guard = self.lock.lock().await;
        let mut items = self.load();
        items.push(QueuedItem::new(request));

        if items.len() > self.max_size {
            let overflow = items.len() - self.max_size;
            items.drain(..overflow);
            warn!(
                dropped = overflow,
                max_size = self.max_size,
                "Queue full, dropped oldest items"
            );
        }

        self.save(&items);
        debug!(pending = items.len(), "Enqueued notification");
    }

    /// Current contents in FIFO order.
    pub async fn list(&self) -> Vec<QueuedItem> {
        let _guard = self.lock.lock().await;
        self.load()
    }

    /// Current queue size.
    pub async fn count(&self) -> usize {
        let _guard = self.lock.lock().await;
        self.load().len()
    }

    /// Overwrite the persisted set with exactly `items`.
    pub async fn replace(&self, items: Vec<QueuedItem>) {
        let _guard = self.lock.lock().await;
        self.save(&items);
        debug!(pending = items.len(), "Rewrote queue");
    }

    /// Discard all queued items.
    pub async fn clear(&self) {
        self.replace(Vec::new()).await;
    }

    /// Load the queue file; any failure reads as an empty queue.
    fn load(&self) -> Vec<QueuedItem> {
        match self.try_load() {
            Ok(items) => items,
            Err(e) => {
                debug!(error = %e, path = %self.path.display(), "Unreadable queue file, treating as empty");
                Vec::new()
            }
        }
    }

    fn try_load(&self) -> OfflineResult<Vec<QueuedItem>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the queue file; failures are logged and dropped.
    fn save(&self, items: &[QueuedItem]) {
        if let Err(e) = self.try_save(items) {
            warn!(error = %e, path = %self.path.display(), "Failed to persist queue");
        }
    }

    fn try_save(&self, items: &[QueuedItem]) -> OfflineResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(items)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
