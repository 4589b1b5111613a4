// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process simulated device
//!
//! Behaves like single-open hardware: a second open while one handle is live
//! fails, as does closing a handle from another session.

use super::{DeviceAdapter, DeviceError, DeviceHandle, DeviceInfo};
use async_trait::async_trait;
use dg_core::DeviceConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct SimState {
    /// Session of the live handle, if any
    open_session: Option<u64>,
    sessions: u64,
    resets: u64,
}

/// Simulated device
#[derive(Clone)]
pub struct SimulatedDevice {
    info: DeviceInfo,
    open_latency: Duration,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedDevice {
    pub fn new(id: u32) -> Self {
        Self {
            info: DeviceInfo {
                id,
                name: "simulated".to_string(),
                machine: "simulated-n150".to_string(),
            },
            open_latency: Duration::ZERO,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            info: DeviceInfo {
                id: config.id,
                name: config.name.clone(),
                machine: config.machine.clone(),
            },
            open_latency: config.open_latency,
            state: Arc::new(Mutex::new(SimState::default())),
        }
    }

    pub fn with_open_latency(mut self, latency: Duration) -> Self {
        self.open_latency = latency;
        self
    }

    pub fn is_open(&self) -> bool {
        self.lock().open_session.is_some()
    }

    /// Number of resets since construction
    pub fn resets(&self) -> u64 {
        self.lock().resets
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DeviceAdapter for SimulatedDevice {
    fn info(&self) -> DeviceInfo {
        self.info.clone()
    }

    async fn open(&self) -> Result<DeviceHandle, DeviceError> {
        if !self.open_latency.is_zero() {
            tokio::time::sleep(self.open_latency).await;
        }

        let mut state = self.lock();
        if let Some(session) = state.open_session {
            return Err(DeviceError::OpenFailed(format!(
                "device {} already open (session {})",
                self.info.id, session
            )));
        }
        state.sessions += 1;
        state.open_session = Some(state.sessions);
        Ok(DeviceHandle::new(self.info.id, state.sessions))
    }

    async fn close(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        let mut state = self.lock();
        match state.open_session {
            Some(session) if session == handle.session() => {
                state.open_session = None;
                Ok(())
            }
            other => Err(DeviceError::CloseFailed(format!(
                "handle session {} does not match open session {:?}",
                handle.session(),
                other
            ))),
        }
    }

    async fn reset(&self) -> Result<String, DeviceError> {
        let mut state = self.lock();
        if state.open_session.is_some() {
            return Err(DeviceError::ResetFailed(
                "device is open; close it before resetting".to_string(),
            ));
        }
        state.resets += 1;
        Ok(format!("device {} reset", self.info.id))
    }
}

#[cfg(test)]
#[path = "simulated_tests.rs"]
mod tests;
