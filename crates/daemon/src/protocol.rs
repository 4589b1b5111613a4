// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol between `dg` and `dgd`
//!
//! One request and one response per connection. Each message is a JSON
//! document preceded by its length as a big-endian `u32`.

use std::time::Duration;

pub use dg_adapters::SoftwareInfo;
use dg_engine::compute::{OperationGroup, ParamSpec};
use dg_engine::{ComputeRequest, ComputeResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Version reported in the hello handshake
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest message either side accepts
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Read/write bound when no configuration says otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Client request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    Ping,
    Hello {
        version: String,
    },
    /// Run an operation with exclusive use of the device
    Execute {
        request: ComputeRequest,
    },
    Stats,
    DeviceStatus,
    /// Reset the device once it is free
    DeviceReset,
    MachineInfo,
    /// Latest commit of the device software checkout
    SoftwareInfo,
    Operations,
    Status,
    Shutdown,
}

/// Device state as reported by `DeviceStatus`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub id: u32,
    pub name: String,
    pub backend: String,
    /// A handle is open right now
    pub open: bool,
    /// Ticket inside the critical section
    pub holder: Option<u64>,
    pub queued: usize,
    pub opens: u64,
    pub closes: u64,
}

/// Daemon response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    Pong,
    Hello {
        version: String,
    },
    Executed {
        request_id: String,
        /// Time from arrival at the daemon to the result
        elapsed_ms: u64,
        result: ComputeResult,
    },
    Stats {
        total_requests: u64,
        currently_waiting: u64,
        max_wait_time_seconds: f64,
        close_failures: u64,
    },
    Device {
        device: DeviceSummary,
    },
    Reset {
        message: String,
    },
    Machine {
        machine_type: String,
        device_id: u32,
    },
    Software {
        software: SoftwareInfo,
    },
    Operations {
        categories: Vec<OperationGroup>,
        params: Vec<ParamSpec>,
    },
    Status {
        uptime_secs: u64,
        total_requests: u64,
        currently_waiting: u64,
    },
    ShuttingDown,
    Error {
        message: String,
    },
}

/// Errors on the wire
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout")]
    Timeout,
}

/// Serialize to JSON bytes, without the length prefix
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one length-prefixed message
///
/// End of stream before the length prefix is [`ProtocolError::ConnectionClosed`].
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut data = vec![0u8; len];
    reader.read_exact(&mut data).await?;
    Ok(data)
}

/// Write one length-prefixed message
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    writer.write_all(&(data.len() as u32).to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
