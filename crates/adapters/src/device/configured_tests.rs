// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn default_config_builds_simulated_device() {
    let device = ConfiguredDevice::from_config(&DeviceConfig::default());

    assert_eq!(device.backend(), DeviceBackend::Simulated);
    assert_eq!(device.info().machine, "simulated-n150");

    let handle = device.open().await.unwrap();
    assert_eq!(handle.device_id(), 0);
    device.close(handle).await.unwrap();
}

#[tokio::test]
async fn command_backend_runs_configured_commands() {
    let config = DeviceConfig {
        id: 3,
        backend: DeviceBackend::Command,
        open_command: vec!["true".to_string()],
        close_command: vec!["true".to_string()],
        reset_command: vec!["echo".to_string(), "reset {id}".to_string()],
        ..DeviceConfig::default()
    };
    let device = ConfiguredDevice::from_config(&config);

    assert_eq!(device.backend(), DeviceBackend::Command);
    let handle = device.open().await.unwrap();
    device.close(handle).await.unwrap();
    assert_eq!(device.reset().await.unwrap(), "reset 3");
}
