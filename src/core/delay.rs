//! Throttling delay inserted at every suspension boundary.
//!
//! The engine never sleeps directly; it asks a [`DelayProvider`]. Production
//! code uses [`TokioDelay`], tests use [`NoDelay`] or [`ManualDelay`] so that
//! no test depends on wall-clock time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};

#[async_trait]
pub trait DelayProvider: Send + Sync {
    /// Wait for `duration`. Must be cancel-safe: the engine drops the future
    /// when a pause or cancel arrives mid-wait.
    async fn delay(&self, duration: Duration);
}

// --- Real implementation ---

/// Sleeps on the Tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl DelayProvider for TokioDelay {
    async fn delay(&self, duration: Duration) {
        if duration.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(duration).await;
        }
    }
}

// --- Fake implementations ---

/// Ignores the requested duration; only yields to the scheduler.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

#[async_trait]
impl DelayProvider for NoDelay {
    async fn delay(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}

/// Test clock: every delay blocks until the test releases a permit.
///
/// Each call records the requested duration, which lets tests observe when
/// a speed change took effect. A run requests its delays one at a time, so
/// reaching the `n`-th request takes `release(n - 1)` first.
pub struct ManualDelay {
    permits: Semaphore,
    open: AtomicBool,
    requested: Mutex<Vec<Duration>>,
    arrived: Notify,
}

impl ManualDelay {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(0),
            open: AtomicBool::new(false),
            requested: Mutex::new(Vec::new()),
            arrived: Notify::new(),
        }
    }

    /// Let `steps` pending or future delays complete.
    pub fn release(&self, steps: usize) {
        self.permits.add_permits(steps);
    }

    /// Stop blocking altogether.
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.permits.add_permits(1);
    }

    /// Durations requested so far, in call order.
    pub fn requested(&self) -> Vec<Duration> {
        self.requested.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requested.lock().len()
    }

    /// Wait until at least `count` delays have been requested.
    pub async fn wait_for_requests(&self, count: usize) {
        loop {
            let notified = self.arrived.notified();
            if self.request_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ManualDelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DelayProvider for ManualDelay {
    async fn delay(&self, duration: Duration) {
        self.requested.lock().push(duration);
        self.arrived.notify_waiters();
        if self.open.load(Ordering::SeqCst) {
            return;
        }
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}
