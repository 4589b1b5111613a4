// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive execution against a single device
//!
//! Every request follows the same lifecycle:
//!
//! ```text
//! QUEUED -> ADMITTED -> OPENED -> RUNNING -> CLOSING -> RELEASED
//!               |                                          ^
//!               +------------- open failed ----------------+
//! ```
//!
//! A request joins the admission queue when [`ExclusiveDevice::run_exclusive`]
//! is called, not when its future is first polled. The critical section runs
//! on its own task, so a caller that stops waiting cannot leave the device
//! open or the gate held.

use crate::error::ExclusiveError;
use dg_adapters::{DeviceAdapter, DeviceError, DeviceHandle, DeviceInfo};
use dg_core::{
    AdmissionGate, Clock, SystemClock, TelemetryRegister, TelemetrySnapshot, Ticket, TicketNumber,
};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::Instrument;

/// Future returned by an exclusive operation, borrowing the open handle
pub type OpFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Point-in-time view of the device and its queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStatus {
    pub info: DeviceInfo,
    /// A handle is open right now
    pub open: bool,
    /// Ticket inside the critical section
    pub holder: Option<TicketNumber>,
    /// Requests queued behind the holder
    pub queued: usize,
    pub opens: u64,
    pub closes: u64,
}

struct Shared<D, C: Clock> {
    device: D,
    gate: Arc<AdmissionGate<C>>,
    telemetry: Arc<TelemetryRegister>,
    opens: AtomicU64,
    closes: AtomicU64,
}

/// A device guarded by a fair admission gate
///
/// Cloning is cheap; clones share the gate, the device and the telemetry.
pub struct ExclusiveDevice<D, C: Clock = SystemClock> {
    shared: Arc<Shared<D, C>>,
}

impl<D, C: Clock> Clone for ExclusiveDevice<D, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D: DeviceAdapter> ExclusiveDevice<D> {
    pub fn new(device: D) -> Self {
        Self::with_clock(device, SystemClock)
    }
}

impl<D: DeviceAdapter, C: Clock> ExclusiveDevice<D, C> {
    pub fn with_clock(device: D, clock: C) -> Self {
        let telemetry = Arc::new(TelemetryRegister::new());
        let gate = Arc::new(AdmissionGate::with_clock(Arc::clone(&telemetry), clock));
        Self {
            shared: Arc::new(Shared {
                device,
                gate,
                telemetry,
                opens: AtomicU64::new(0),
                closes: AtomicU64::new(0),
            }),
        }
    }

    pub fn device(&self) -> &D {
        &self.shared.device
    }

    /// Consistent copy of the request counters
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.shared.telemetry.snapshot()
    }

    pub fn status(&self) -> DeviceStatus {
        let opens = self.shared.opens.load(Ordering::SeqCst);
        let closes = self.shared.closes.load(Ordering::SeqCst);
        DeviceStatus {
            info: self.shared.device.info(),
            open: opens > closes,
            holder: self.shared.gate.holder(),
            queued: self.shared.gate.queue_len(),
            opens,
            closes,
        }
    }

    /// Refuse new requests and abandon queued ones
    ///
    /// The request inside the critical section, if any, runs to completion
    /// and still closes the device.
    pub fn shutdown(&self) {
        self.shared.gate.close();
    }

    /// Run `op` with the device open and no other request inside
    ///
    /// The request's place in line is taken before this returns. The device is
    /// closed after `op` finishes, fails or panics, and the gate is released
    /// only after that close. Must be called from within a tokio runtime.
    pub fn run_exclusive<T, E, F>(
        &self,
        op: F,
    ) -> impl Future<Output = Result<T, ExclusiveError<E>>> + Send + 'static
    where
        F: for<'a> FnOnce(&'a mut DeviceHandle) -> OpFuture<'a, T, E> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let ticket = self.shared.gate.enqueue();
        let shared = Arc::clone(&self.shared);
        let span = tracing::debug_span!("exclusive", ticket = ticket.number());
        self.spawn_request(
            async move {
                let grant = ticket.granted().await?;
                let result = shared.run_admitted(op).await;
                grant.release();
                result
            }
            .instrument(span),
        )
    }

    /// Reset the device once every request queued ahead of this one is done
    ///
    /// A reset never overlaps an open handle: it takes the gate like any
    /// other request but skips the open and close.
    pub fn reset(
        &self,
    ) -> impl Future<Output = Result<String, ExclusiveError<DeviceError>>> + Send + 'static {
        let ticket = self.shared.gate.enqueue();
        let shared = Arc::clone(&self.shared);
        let span = tracing::debug_span!("reset", ticket = ticket.number());
        self.spawn_request(
            async move {
                let grant = ticket.granted().await?;
                let result = shared
                    .device
                    .reset()
                    .await
                    .map_err(|source| ExclusiveError::Operation {
                        source,
                        close: None,
                    });
                grant.release();
                result
            }
            .instrument(span),
        )
    }

    /// Drive `body` to completion on its own task and count it when done
    fn spawn_request<T, E, Fut>(
        &self,
        body: Fut,
    ) -> impl Future<Output = Result<T, ExclusiveError<E>>> + Send + 'static
    where
        Fut: Future<Output = Result<T, ExclusiveError<E>>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let telemetry = Arc::clone(&self.shared.telemetry);
        let task = tokio::spawn(async move {
            // An unwinding body has already dropped (and so released) its grant
            let result = AssertUnwindSafe(body)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(%message, "critical section panicked outside the operation");
                    Err(ExclusiveError::Aborted(message))
                });
            telemetry.record_completion();
            result
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(ExclusiveError::Aborted(e.to_string())))
        }
    }
}

impl<D: DeviceAdapter, C: Clock> Shared<D, C> {
    /// Open, run, close. Runs while holding the gate.
    async fn run_admitted<T, E, F>(&self, op: F) -> Result<T, ExclusiveError<E>>
    where
        F: for<'a> FnOnce(&'a mut DeviceHandle) -> OpFuture<'a, T, E> + Send + 'static,
    {
        let mut handle = match self.device.open().await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "open failed, releasing gate");
                return Err(ExclusiveError::Open(e));
            }
        };
        self.opens.fetch_add(1, Ordering::SeqCst);
        let session = handle.session();

        // Calling `op` happens inside the guarded future so a panic while
        // building the operation is caught too
        let outcome = AssertUnwindSafe(async { op(&mut handle).await })
            .catch_unwind()
            .await;

        let close = self.close(handle).await;

        match outcome {
            Ok(Ok(value)) => {
                if let Some(e) = &close {
                    tracing::error!(session, error = %e, "close failed after operation succeeded");
                }
                Ok(value)
            }
            Ok(Err(source)) => {
                if let Some(e) = &close {
                    tracing::error!(session, error = %e, "close failed after operation error");
                }
                Err(ExclusiveError::Operation { source, close })
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(session, %message, "operation panicked");
                Err(ExclusiveError::Panicked { message, close })
            }
        }
    }

    /// Close the handle, counting the attempt whether or not it succeeds
    async fn close(&self, handle: DeviceHandle) -> Option<DeviceError> {
        let result = self.device.close(handle).await;
        self.closes.fetch_add(1, Ordering::SeqCst);
        match result {
            Ok(()) => None,
            Err(e) => {
                self.telemetry.record_close_failure();
                Some(e)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "exclusive_tests.rs"]
mod tests;
