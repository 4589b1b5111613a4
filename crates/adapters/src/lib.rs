// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the exclusive device

pub mod device;
pub mod software;
pub mod traced;

pub use device::{
    CommandDevice, ConfiguredDevice, DeviceAdapter, DeviceError, DeviceHandle, DeviceInfo,
    SimulatedDevice,
};
pub use software::{GitProvenance, SoftwareError, SoftwareInfo};
pub use traced::TracedDevice;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod capture;
#[cfg(any(test, feature = "test-support"))]
pub use device::{DeviceCall, FakeDevice};
