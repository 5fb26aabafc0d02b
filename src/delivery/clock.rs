//! Tick sources for the delivery scheduler.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};

/// Source of delivery ticks. Each call to [`Clock::tick`] suspends until the
/// next chunk may be emitted.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn tick(&self, interval: Duration);
}

/// Wall-clock ticks backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn tick(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Ticks ignore the requested interval and complete only when [`advance`]
/// releases them. Every call to `tick` is counted on entry, so a caller that
/// waits for request `n + 1` knows the delivery has finished emitting chunk `n`.
///
/// [`advance`]: ManualClock::advance
#[derive(Debug)]
pub struct ManualClock {
    permits: Semaphore,
    requested: watch::Sender<u64>,
}

impl ManualClock {
    pub fn new() -> Self {
        let (requested, _) = watch::channel(0);
        Self {
            permits: Semaphore::new(0),
            requested,
        }
    }

    /// Release `ticks` pending or future ticks.
    pub fn advance(&self, ticks: usize) {
        self.permits.add_permits(ticks);
    }

    /// Number of `tick` calls made so far, released or not.
    pub fn ticks_requested(&self) -> u64 {
        *self.requested.borrow()
    }

    /// Wait until at least `count` ticks have been requested.
    pub async fn wait_for_tick_requests(&self, count: u64) {
        let mut rx = self.requested.subscribe();
        let _ = rx.wait_for(|requested| *requested >= count).await;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn tick(&self, _interval: Duration) {
        self.requested.send_modify(|requested| *requested += 1);
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }
}
