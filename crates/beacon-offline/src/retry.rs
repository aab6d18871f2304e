//! Drain loop: periodic and on-demand delivery of queued notifications.

use crate::{DeliveryError, OfflineStore};
use beacon_types::Notification;
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Capability for delivering a single notification to the remote service.
///
/// Implementations report success only on a confirmed-accepted response and
/// map every fault to a [`DeliveryError`] instead of letting it propagate.
/// The drain loop treats a returned error exactly like a non-success: one
/// failed attempt for that item.
pub trait DeliverNotification: Send + Sync {
    /// Attempt delivery of one notification.
    fn deliver(&self, request: Notification) -> BoxFuture<'_, Result<(), DeliveryError>>;
}

/// Drain timer configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay before the first drain pass, in seconds.
    pub initial_delay_secs: u64,
    /// Interval between drain passes, in seconds.
    pub period_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 30,
            period_secs: 60,
        }
    }
}

/// Periodically flushes the offline store through the injected send
/// capability.
///
/// At most one drain pass runs at a time: a drain attempted while another
/// is in progress returns immediately with zero effect rather than waiting.
/// Sends happen outside the store lock; only the initial snapshot and the
/// final rewrite take it, so enqueues can interleave with a pass.
pub struct RetryScheduler {
    store: Arc<OfflineStore>,
    sender: Arc<dyn DeliverNotification>,
    /// Admission gate: held for the duration of one drain pass.
    gate: Mutex<()>,
    /// Consecutive passes that ended with items still queued.
    failure_streak: AtomicU32,
}

impl RetryScheduler {
    /// Create a scheduler over the given store and send capability.
    pub fn new(store: Arc<OfflineStore>, sender: Arc<dyn DeliverNotification>) -> Arc<Self> {
        Arc::new(Self {
            store,
            sender,
            gate: Mutex::new(()),
            failure_streak: AtomicU32::new(0),
        })
    }

    /// Start the repeating drain timer.
    ///
    /// The caller owns the handle and aborts it at shutdown. An in-flight
    /// pass is not forcibly cancelled; a final send may race process exit.
    pub fn spawn(self: Arc<Self>, config: RetryConfig) -> JoinHandle<()> {
        let scheduler = self;
        info!(
            initial_delay_secs = config.initial_delay_secs,
            period_secs = config.period_secs,
            "Starting retry timer"
        );
        tokio::spawn(async move {
            let start = Instant::now() + Duration::from_secs(config.initial_delay_secs);
            let mut ticker = interval_at(start, Duration::from_secs(config.period_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                scheduler.drain().await;
            }
        })
    }

    /// One pass over the queue: deliver every item in FIFO order and keep
    /// only the failures, in their original relative order.
    ///
    /// Returns the number of items delivered; 0 when the queue was empty or
    /// another drain already holds the admission gate.
    pub async fn drain(&self) -> usize {
        let _admission = match self.gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Drain already in progress, skipping");
                return 0;
            }
        };

        let snapshot = self.store.list().await;
        if snapshot.is_empty() {
            self.failure_streak.store(0, Ordering::Relaxed);
            return 0;
        }

        debug!(pending = snapshot.len(), "Draining offline queue");

        let mut remaining = Vec::new();
        let mut delivered = 0usize;
        for item in snapshot {
            match self.sender.deliver(item.request.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    debug!(error = %e, "Delivery failed, item stays queued");
                    remaining.push(item);
                }
            }
        }

        let still_failing = remaining.len();
        self.store.replace(remaining).await;

        if still_failing == 0 {
            self.failure_streak.store(0, Ordering::Relaxed);
        } else {
            let streak = self.failure_streak.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(still_failing, streak, "Drain pass left items queued");
        }

        if delivered > 0 {
            info!(delivered, still_failing, "Drain pass complete");
        }
        delivered
    }

    /// Consecutive drain passes that ended with items still queued.
    ///
    /// Informational only; it does not alter the timer interval.
    pub fn failure_streak(&self) -> u32 {
        self.failure_streak.load(Ordering::Relaxed)
    }
}
