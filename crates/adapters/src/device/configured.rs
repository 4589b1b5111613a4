// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device selected by configuration at startup

use super::{CommandDevice, DeviceAdapter, DeviceError, DeviceHandle, DeviceInfo, SimulatedDevice};
use async_trait::async_trait;
use dg_core::{DeviceBackend, DeviceConfig};

/// Whichever backend `device.backend` names
#[derive(Clone)]
pub enum ConfiguredDevice {
    Simulated(SimulatedDevice),
    Command(CommandDevice),
}

impl ConfiguredDevice {
    pub fn from_config(config: &DeviceConfig) -> Self {
        match config.backend {
            DeviceBackend::Simulated => Self::Simulated(SimulatedDevice::from_config(config)),
            DeviceBackend::Command => Self::Command(CommandDevice::from_config(config)),
        }
    }

    pub fn backend(&self) -> DeviceBackend {
        match self {
            Self::Simulated(_) => DeviceBackend::Simulated,
            Self::Command(_) => DeviceBackend::Command,
        }
    }
}

#[async_trait]
impl DeviceAdapter for ConfiguredDevice {
    fn info(&self) -> DeviceInfo {
        match self {
            Self::Simulated(d) => d.info(),
            Self::Command(d) => d.info(),
        }
    }

    async fn open(&self) -> Result<DeviceHandle, DeviceError> {
        match self {
            Self::Simulated(d) => d.open().await,
            Self::Command(d) => d.open().await,
        }
    }

    async fn close(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        match self {
            Self::Simulated(d) => d.close(handle).await,
            Self::Command(d) => d.close(handle).await,
        }
    }

    async fn reset(&self) -> Result<String, DeviceError> {
        match self {
            Self::Simulated(d) => d.reset().await,
            Self::Command(d) => d.reset().await,
        }
    }
}

#[cfg(test)]
#[path = "configured_tests.rs"]
mod tests;
