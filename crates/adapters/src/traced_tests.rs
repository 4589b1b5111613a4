// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::capture::with_tracing;
use crate::device::{DeviceCall, FakeDevice};

#[test]
fn traced_open_and_close_log_spans_and_timing() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedDevice::new(FakeDevice::new());
        let handle = traced.open().await?;
        traced.close(handle).await
    });

    assert!(result.is_ok(), "open/close should succeed: {:?}", result);
    assert!(
        logs.contains("device.open"),
        "Should log open span. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("device opened"),
        "Should log open completion. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("device.close") && logs.contains("device closed"),
        "Should log close. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_close_failure_is_logged_as_error() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeDevice::new();
        fake.fail_closes(Some("bus fault"));
        let traced = TracedDevice::new(fake);
        let handle = traced.open().await?;
        traced.close(handle).await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("ERROR") && logs.contains("close failed"),
        "Should log close failure at error. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("bus fault"),
        "Should log the cause. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_reset_logs_warning() {
    let (logs, result) = with_tracing(|| async {
        TracedDevice::new(FakeDevice::new()).reset().await
    });

    assert_eq!(result.unwrap(), "fake reset");
    assert!(
        logs.contains("WARN") && logs.contains("resetting device"),
        "Should warn before reset. Logs:\n{}",
        logs
    );
}

#[tokio::test]
async fn traced_device_delegates_to_inner() {
    let fake = FakeDevice::new();
    let traced = TracedDevice::new(fake.clone());

    let handle = traced.open().await.unwrap();
    traced.close(handle).await.unwrap();

    assert_eq!(
        fake.calls(),
        vec![DeviceCall::Open, DeviceCall::Close { session: 1 }]
    );
    assert_eq!(traced.info(), fake.info());
}
