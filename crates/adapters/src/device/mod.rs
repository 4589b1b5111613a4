// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device adapters
//!
//! A device is opened for the span of one operation and closed right after.
//! The handle returned by `open` is the only proof of an open device and is
//! consumed by `close`.

mod command;
mod configured;
mod simulated;

pub use command::CommandDevice;
pub use configured::ConfiguredDevice;
pub use simulated::SimulatedDevice;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DeviceCall, FakeDevice};

use async_trait::async_trait;
use std::time::Instant;
use thiserror::Error;

/// Errors from device operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("failed to open device: {0}")]
    OpenFailed(String),
    #[error("failed to close device: {0}")]
    CloseFailed(String),
    #[error("device reset failed: {0}")]
    ResetFailed(String),
}

/// An open device
///
/// Not `Clone`: exactly one owner exists between open and close.
#[derive(Debug)]
pub struct DeviceHandle {
    device_id: u32,
    session: u64,
    opened_at: Instant,
}

impl DeviceHandle {
    pub fn new(device_id: u32, session: u64) -> Self {
        Self {
            device_id,
            session,
            opened_at: Instant::now(),
        }
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Sequence number of the open that produced this handle
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }
}

/// Static description of a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: u32,
    pub name: String,
    pub machine: String,
}

/// Adapter for the exclusive device
#[async_trait]
pub trait DeviceAdapter: Clone + Send + Sync + 'static {
    /// Describe the device without touching it
    fn info(&self) -> DeviceInfo;

    /// Open the device
    async fn open(&self) -> Result<DeviceHandle, DeviceError>;

    /// Close a previously opened device
    async fn close(&self, handle: DeviceHandle) -> Result<(), DeviceError>;

    /// Reset the device, returning any diagnostic output
    ///
    /// Must only be called while no handle is open.
    async fn reset(&self) -> Result<String, DeviceError>;
}
