// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use std::time::Instant;

use dg_adapters::{DeviceAdapter, GitProvenance, SoftwareError};
use dg_core::{IdGen, ServerConfig};
use dg_daemon::protocol::{self, DeviceSummary, Request, Response, PROTOCOL_VERSION};
use dg_engine::{compute, ExclusiveDevice, ExclusiveError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn, Instrument};

/// State shared by every connection task
pub struct ServerContext<D: DeviceAdapter, I: IdGen> {
    pub device: ExclusiveDevice<D>,
    ids: I,
    server: ServerConfig,
    /// Label reported by device status
    backend: String,
    /// Source of the software commit report, when configured
    software: Option<GitProvenance>,
    start_time: Instant,
    /// Signalled when a client asks the daemon to stop
    pub shutdown: Notify,
}

impl<D: DeviceAdapter, I: IdGen> ServerContext<D, I> {
    pub fn new(device: ExclusiveDevice<D>, ids: I, server: ServerConfig) -> Self {
        let backend = device.device().info().name;
        Self {
            device,
            ids,
            server,
            backend,
            software: None,
            start_time: Instant::now(),
            shutdown: Notify::new(),
        }
    }

    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = backend.into();
        self
    }

    pub fn with_software(mut self, software: Option<GitProvenance>) -> Self {
        self.software = software;
        self
    }
}

/// Handle a single client connection
pub async fn handle_connection<D, I, S>(
    ctx: &ServerContext<D, I>,
    stream: S,
) -> Result<(), ServerError>
where
    D: DeviceAdapter,
    I: IdGen,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let timeout = ctx.server.request_timeout;
    let (mut reader, mut writer) = tokio::io::split(stream);

    // Read request with timeout
    let request = match protocol::read_request(&mut reader, timeout).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    let response = handle_request(ctx, request).await;

    debug!("Sending response: {:?}", response);

    // The wait in the queue is not bounded, only the write is
    protocol::write_response(&mut writer, &response, timeout)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Handle a single request and return a response
pub async fn handle_request<D: DeviceAdapter, I: IdGen>(
    ctx: &ServerContext<D, I>,
    request: Request,
) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::Hello { version: _ } => Response::Hello {
            version: PROTOCOL_VERSION.to_string(),
        },

        Request::Execute { request } => {
            let request_id = ctx.ids.next();
            let started = Instant::now();
            let span = tracing::info_span!(
                "execute",
                request_id = %request_id,
                operation = %request.operation
            );

            let outcome = ctx
                .device
                .run_exclusive(move |handle| {
                    Box::pin(async move { compute::execute(handle, &request) })
                })
                .instrument(span.clone())
                .await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            span.in_scope(|| match outcome {
                Ok(result) => {
                    info!(elapsed_ms, "request complete");
                    Response::Executed {
                        request_id: request_id.to_string(),
                        elapsed_ms,
                        result,
                    }
                }
                Err(e) => {
                    warn!(elapsed_ms, error = %e, "request failed");
                    Response::Error {
                        message: error_message(&e),
                    }
                }
            })
        }

        Request::Stats => {
            let snap = ctx.device.telemetry();
            Response::Stats {
                total_requests: snap.total_requests,
                currently_waiting: snap.currently_waiting,
                max_wait_time_seconds: snap.max_wait_time_seconds(),
                close_failures: snap.close_failures,
            }
        }

        Request::DeviceStatus => {
            let status = ctx.device.status();
            Response::Device {
                device: DeviceSummary {
                    id: status.info.id,
                    name: status.info.name,
                    backend: ctx.backend.clone(),
                    open: status.open,
                    holder: status.holder,
                    queued: status.queued,
                    opens: status.opens,
                    closes: status.closes,
                },
            }
        }

        Request::DeviceReset => match ctx.device.reset().await {
            Ok(message) => {
                info!("device reset");
                Response::Reset { message }
            }
            Err(e) => {
                warn!(error = %e, "device reset failed");
                Response::Error {
                    message: e.to_string(),
                }
            }
        },

        Request::MachineInfo => {
            let info = ctx.device.device().info();
            Response::Machine {
                machine_type: info.machine,
                device_id: info.id,
            }
        }

        Request::SoftwareInfo => {
            let result = match &ctx.software {
                Some(git) => git.latest_commit().await,
                None => Err(SoftwareError::NotConfigured),
            };
            match result {
                Ok(software) => Response::Software { software },
                Err(e) => {
                    debug!(error = %e, "software info unavailable");
                    Response::Error {
                        message: e.to_string(),
                    }
                }
            }
        }

        Request::Operations => Response::Operations {
            categories: compute::catalog(),
            params: compute::param_catalog(),
        },

        Request::Status => {
            let snap = ctx.device.telemetry();
            Response::Status {
                uptime_secs: ctx.start_time.elapsed().as_secs(),
                total_requests: snap.total_requests,
                currently_waiting: snap.currently_waiting,
            }
        }

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

/// Operation error, followed by the close failure if one came with it
fn error_message<E: std::fmt::Display>(e: &ExclusiveError<E>) -> String {
    match e.close_error() {
        Some(close) => format!("{}; {}", e, close),
        None => e.to_string(),
    }
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
