//! Sweeper service — periodic idle-session eviction.
//!
//! Wakes every `interval`, evicts sessions idle for longer than
//! `idle_threshold`, and goes back to sleep until stopped.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tracing::{debug, info};

use super::store::SessionStore;

/// Default sweep period and idle threshold: 30 minutes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Background task that runs [`SessionStore::sweep`] on a fixed period.
pub struct SessionSweeper<C> {
    store: Arc<SessionStore<C>>,
    interval: Duration,
    idle_threshold: Duration,
    shutdown: Arc<Notify>,
}

impl<C> SessionSweeper<C> {
    pub fn new(store: Arc<SessionStore<C>>, interval: Duration, idle_threshold: Duration) -> Self {
        Self {
            store,
            interval,
            idle_threshold,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Run the sweep loop. Returns when [`stop`](Self::stop) is called.
    pub async fn start(&self) -> anyhow::Result<()> {
        info!(
            interval_s = self.interval.as_secs(),
            idle_threshold_s = self.idle_threshold.as_secs(),
            "session sweeper started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.tick().await;
                }
                _ = self.shutdown.notified() => {
                    info!("session sweeper shutting down");
                    return Ok(());
                }
            }
        }
    }

    /// Stop the sweep loop.
    pub fn stop(&self) {
        info!("stopping session sweeper");
        self.shutdown.notify_one();
    }

    /// Run a single sweep now. Returns the number of sessions evicted.
    pub async fn tick(&self) -> usize {
        let removed = self.store.sweep(Utc::now(), self.idle_threshold).await;
        if removed > 0 {
            info!(removed, "evicted idle sessions");
        } else {
            debug!("sweep: no idle sessions");
        }
        removed
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
