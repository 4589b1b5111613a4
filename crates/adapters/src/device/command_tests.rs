// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn device(open: &[&str], close: &[&str], reset: &[&str]) -> CommandDevice {
    let config = DeviceConfig {
        id: 4,
        open_command: argv(open),
        close_command: argv(close),
        reset_command: argv(reset),
        command_timeout: Duration::from_secs(5),
        ..DeviceConfig::default()
    };
    CommandDevice::from_config(&config)
}

#[tokio::test]
async fn successful_commands_open_and_close() {
    let device = device(&["true"], &["true"], &["echo", "reset {id}"]);

    let handle = device.open().await.unwrap();
    assert_eq!(handle.device_id(), 4);
    assert_eq!(handle.session(), 1);
    device.close(handle).await.unwrap();

    assert_eq!(device.reset().await.unwrap(), "reset 4");
}

#[tokio::test]
async fn failing_open_reports_stderr() {
    let device = device(&["sh", "-c", "echo no board >&2; exit 3"], &["true"], &["true"]);

    let err = device.open().await.unwrap_err();
    match err {
        DeviceError::OpenFailed(msg) => assert!(msg.contains("no board"), "got: {}", msg),
        other => panic!("expected OpenFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn failing_close_is_close_error() {
    let device = device(&["true"], &["false"], &["true"]);
    let handle = device.open().await.unwrap();
    assert!(matches!(
        device.close(handle).await,
        Err(DeviceError::CloseFailed(_))
    ));
}

#[tokio::test]
async fn missing_program_is_open_error() {
    let device = device(&["/nonexistent/devctl"], &["true"], &["true"]);
    assert!(matches!(
        device.open().await,
        Err(DeviceError::OpenFailed(_))
    ));
}

#[tokio::test]
async fn slow_command_times_out() {
    let mut device = device(&["sleep", "5"], &["true"], &["true"]);
    device.timeout = Duration::from_millis(50);

    let err = device.open().await.unwrap_err();
    assert!(err.to_string().contains("timed out"), "got: {}", err);
}
