// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! devgate daemon wire protocol, shared with the CLI

pub mod protocol;

pub use protocol::{DeviceSummary, ProtocolError, Request, Response, SoftwareInfo};
