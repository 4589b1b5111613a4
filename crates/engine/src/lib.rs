// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Devgate execution engine: exclusive device access and the operations run
//! under it

pub mod compute;
mod error;
mod exclusive;

pub use compute::{ComputeError, ComputeRequest, ComputeResult, Input};
pub use error::ExclusiveError;
pub use exclusive::{DeviceStatus, ExclusiveDevice, OpFuture};
