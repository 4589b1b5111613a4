// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrapper for consistent observability

use crate::device::{DeviceAdapter, DeviceError, DeviceHandle, DeviceInfo};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any DeviceAdapter
#[derive(Clone)]
pub struct TracedDevice<D> {
    inner: D,
}

impl<D> TracedDevice<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: DeviceAdapter> DeviceAdapter for TracedDevice<D> {
    fn info(&self) -> DeviceInfo {
        self.inner.info()
    }

    async fn open(&self) -> Result<DeviceHandle, DeviceError> {
        let info = self.inner.info();
        let span = tracing::info_span!("device.open", device_id = info.id, name = %info.name);

        async {
            tracing::debug!("opening");
            let start = std::time::Instant::now();
            let result = self.inner.open().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(handle) => tracing::info!(
                    session = handle.session(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "device opened"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "open failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn close(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        let span = tracing::info_span!(
            "device.close",
            device_id = handle.device_id(),
            session = handle.session()
        );

        async {
            let held_ms = handle.opened_at().elapsed().as_millis() as u64;
            let result = self.inner.close(handle).await;

            match &result {
                Ok(()) => tracing::info!(held_ms, "device closed"),
                Err(e) => tracing::error!(held_ms, error = %e, "close failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn reset(&self) -> Result<String, DeviceError> {
        let span = tracing::info_span!("device.reset", device_id = self.inner.info().id);

        async {
            tracing::warn!("resetting device");
            let start = std::time::Instant::now();
            let result = self.inner.reset().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(output) => tracing::info!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    output_len = output.len(),
                    "device reset"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "reset failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
