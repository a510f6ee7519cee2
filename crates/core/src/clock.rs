// SPDX-License-Identifier: MIT

//! Clock abstraction for testable liveness timeouts.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current time, in epoch milliseconds.
///
/// The fleet only ever compares heartbeat timestamps against timeouts, so
/// epoch milliseconds are all it needs.
pub trait Clock: Clone + Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Real system clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Controllable clock for lifecycle tests.
#[derive(Clone)]
pub struct TestClock {
    now_ms: Arc<Mutex<u64>>,
}

impl TestClock {
    /// Starts at an arbitrary non-zero epoch so "never heard" (None) and
    /// "heard at time zero" stay distinguishable in tests.
    pub fn new() -> Self {
        Self::at(1_000_000)
    }

    pub fn at(epoch_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(Mutex::new(epoch_ms)),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now_ms.lock() += by.as_millis() as u64;
    }

    pub fn set(&self, epoch_ms: u64) {
        *self.now_ms.lock() = epoch_ms;
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        *self.now_ms.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
