// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running aggregates for requests passing through the admission gate
//!
//! The register keeps no history: only totals and a high-water mark. All
//! counters live behind one lock of their own, separate from the gate's, so a
//! reader never observes a half-applied transition.

use std::sync::Mutex;
use std::time::Duration;

/// Point-in-time copy of the register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Requests that finished (success or failure)
    pub total_requests: u64,
    /// Requests that joined the queue but were not yet granted the gate
    pub currently_waiting: u64,
    /// Longest observed wait between joining the queue and being granted
    pub max_wait_time: Duration,
    /// Closes that failed after the operation itself had finished
    pub close_failures: u64,
}

impl TelemetrySnapshot {
    pub fn max_wait_time_seconds(&self) -> f64 {
        self.max_wait_time.as_secs_f64()
    }
}

/// Shared, mutation-safe counter set
#[derive(Debug, Default)]
pub struct TelemetryRegister {
    inner: Mutex<TelemetrySnapshot>,
}

impl TelemetryRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent copy of all counters
    pub fn snapshot(&self) -> TelemetrySnapshot {
        *self.lock()
    }

    /// A request entered the queue
    pub fn record_arrival(&self) {
        self.lock().currently_waiting += 1;
    }

    /// A waiting request was granted the gate after `wait`
    ///
    /// Leaving the queue and the wait sample land together.
    pub fn record_grant(&self, wait: Duration) {
        let mut inner = self.lock();
        inner.currently_waiting = leave_queue(inner.currently_waiting);
        keep_max(&mut inner, wait);
    }

    /// A waiting request left the queue without being granted
    pub fn record_abandoned(&self) {
        let mut inner = self.lock();
        inner.currently_waiting = leave_queue(inner.currently_waiting);
    }

    /// Keep the larger of the current maximum and `wait`
    pub fn record_wait_sample(&self, wait: Duration) {
        keep_max(&mut self.lock(), wait);
    }

    /// A request finished, whatever its outcome
    pub fn record_completion(&self) {
        self.lock().total_requests += 1;
    }

    pub fn record_close_failure(&self) {
        self.lock().close_failures += 1;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TelemetrySnapshot> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn keep_max(inner: &mut TelemetrySnapshot, wait: Duration) {
    if wait > inner.max_wait_time {
        inner.max_wait_time = wait;
    }
}

fn leave_queue(waiting: u64) -> u64 {
    debug_assert!(waiting > 0, "request left an empty queue");
    waiting.saturating_sub(1)
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
