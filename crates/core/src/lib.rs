// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dg-core: Core library for the devgate exclusive device gatekeeper
//!
//! This crate provides:
//! - A fair (FIFO) admission gate admitting one holder at a time
//! - The telemetry register fed by the gate and the lifecycle manager
//! - Clock and request-id abstractions for deterministic tests
//! - TOML configuration types

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod clock;
pub mod config;
pub mod gate;
pub mod id;
pub mod telemetry;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, DeviceBackend, DeviceConfig, GateConfig, ServerConfig};
pub use gate::{AdmissionGate, GateError, Grant, Ticket, TicketNumber};
pub use id::{IdGen, RequestId, SequentialIdGen, UuidIdGen};
pub use telemetry::{TelemetryRegister, TelemetrySnapshot};
