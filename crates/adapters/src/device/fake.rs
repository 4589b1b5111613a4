// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake device adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DeviceAdapter, DeviceError, DeviceHandle, DeviceInfo};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded device call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Open,
    Close { session: u64 },
    Reset,
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<DeviceCall>,
    sessions: u64,
    open_now: usize,
    max_open: usize,
    fail_opens: Option<String>,
    fail_closes: Option<String>,
    fail_resets: Option<String>,
}

/// Fake device adapter for testing
///
/// Records every call and tracks how many handles were open at once, so tests
/// can assert exclusivity directly.
#[derive(Clone, Default)]
pub struct FakeDevice {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    pub fn open_count(&self) -> usize {
        self.count(|c| matches!(c, DeviceCall::Open))
    }

    pub fn close_count(&self) -> usize {
        self.count(|c| matches!(c, DeviceCall::Close { .. }))
    }

    /// Handles open right now
    pub fn open_now(&self) -> usize {
        self.lock().open_now
    }

    /// Most handles ever open at the same time
    pub fn max_concurrent_open(&self) -> usize {
        self.lock().max_open
    }

    /// Make every open fail until cleared
    pub fn fail_opens(&self, reason: Option<&str>) {
        self.lock().fail_opens = reason.map(str::to_string);
    }

    /// Make every close fail until cleared
    pub fn fail_closes(&self, reason: Option<&str>) {
        self.lock().fail_closes = reason.map(str::to_string);
    }

    /// Make every reset fail until cleared
    pub fn fail_resets(&self, reason: Option<&str>) {
        self.lock().fail_resets = reason.map(str::to_string);
    }

    fn count(&self, pred: impl Fn(&DeviceCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DeviceAdapter for FakeDevice {
    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            id: 0,
            name: "fake".to_string(),
            machine: "fake-machine".to_string(),
        }
    }

    async fn open(&self) -> Result<DeviceHandle, DeviceError> {
        let mut state = self.lock();
        state.calls.push(DeviceCall::Open);
        if let Some(reason) = &state.fail_opens {
            return Err(DeviceError::OpenFailed(reason.clone()));
        }
        state.sessions += 1;
        state.open_now += 1;
        state.max_open = state.max_open.max(state.open_now);
        Ok(DeviceHandle::new(0, state.sessions))
    }

    async fn close(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        let mut state = self.lock();
        state.calls.push(DeviceCall::Close {
            session: handle.session(),
        });
        // The handle is gone either way; a failed close still ends the session
        state.open_now = state.open_now.saturating_sub(1);
        match &state.fail_closes {
            Some(reason) => Err(DeviceError::CloseFailed(reason.clone())),
            None => Ok(()),
        }
    }

    async fn reset(&self) -> Result<String, DeviceError> {
        let mut state = self.lock();
        state.calls.push(DeviceCall::Reset);
        match &state.fail_resets {
            Some(reason) => Err(DeviceError::ResetFailed(reason.clone())),
            None => Ok("fake reset".to_string()),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
