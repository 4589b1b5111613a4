// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for exclusive execution

use dg_adapters::DeviceError;
use dg_core::GateError;
use thiserror::Error;

/// Why an exclusive request did not produce a value
///
/// `E` is the operation's own error type. Whenever the device was opened, the
/// outcome of closing it travels with the error so neither failure hides the
/// other.
#[derive(Debug, Error)]
pub enum ExclusiveError<E> {
    /// The gate shut down before this request was admitted
    #[error("device unavailable: {0}")]
    Gate(#[from] GateError),
    /// Opening failed; no operation ran and there was nothing to close
    #[error(transparent)]
    Open(DeviceError),
    /// The operation returned an error
    #[error("{source}")]
    Operation {
        source: E,
        close: Option<DeviceError>,
    },
    /// The operation panicked
    #[error("operation panicked: {message}")]
    Panicked {
        message: String,
        close: Option<DeviceError>,
    },
    /// The critical section died outside the operation (adapter panic or
    /// runtime shutdown)
    #[error("request aborted: {0}")]
    Aborted(String),
}

impl<E> ExclusiveError<E> {
    /// Close failure that accompanied this error, if any
    pub fn close_error(&self) -> Option<&DeviceError> {
        match self {
            ExclusiveError::Operation { close, .. } | ExclusiveError::Panicked { close, .. } => {
                close.as_ref()
            }
            _ => None,
        }
    }
}
