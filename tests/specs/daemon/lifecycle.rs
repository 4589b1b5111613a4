//! Daemon lifecycle specs
//!
//! Verify daemon start/stop/status lifecycle.

use crate::prelude::*;

#[test]
fn daemon_status_when_not_running() {
    let temp = Project::empty();

    temp.dg()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_start_reports_success() {
    let temp = Project::empty();

    temp.dg()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon started");
}

#[test]
fn daemon_start_twice_is_harmless() {
    let temp = Project::empty();
    temp.dg().args(&["daemon", "start"]).passes();

    temp.dg()
        .args(&["daemon", "start"])
        .passes()
        .stdout_has("Daemon already running");
}

#[test]
fn daemon_status_shows_running_after_start() {
    let temp = Project::empty();
    temp.dg().args(&["daemon", "start"]).passes();

    temp.dg()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon running")
        .stdout_has("uptime:")
        .stdout_has(&format!("version:   {}", env!("CARGO_PKG_VERSION")))
        .stdout_has("device-0.sock");
}

#[test]
fn daemon_writes_pid_and_log() {
    let temp = Project::empty();
    temp.dg().args(&["daemon", "start"]).passes();

    assert!(temp.state_dir().join("daemon.pid").exists());
    let log = std::fs::read_to_string(temp.state_dir().join("daemon.log")).unwrap();
    assert!(log.contains("--- dgd: starting (pid: "), "log:\n{log}");
}

#[test]
fn daemon_stop_reports_success() {
    let temp = Project::empty();
    temp.dg().args(&["daemon", "start"]).passes();

    temp.dg()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon stopped");
}

#[test]
fn daemon_status_after_stop() {
    let temp = Project::empty();
    temp.dg().args(&["daemon", "start"]).passes();
    temp.dg().args(&["daemon", "stop"]).passes();

    temp.dg()
        .args(&["daemon", "status"])
        .passes()
        .stdout_has("Daemon not running");
    assert!(!temp.state_dir().join("daemon.pid").exists());
}

#[test]
fn daemon_stop_when_not_running() {
    let temp = Project::empty();

    temp.dg()
        .args(&["daemon", "stop"])
        .passes()
        .stdout_has("Daemon not running");
}

#[test]
fn daemon_serves_configured_device() {
    let temp = Project::with_config("[device]\nid = 2\nmachine = \"n300\"\n");

    temp.dg()
        .args(&["device", "info"])
        .passes()
        .stdout_has("n300 (device 2)");
    assert!(temp.socket_dir().join("device-2.sock").exists());
}

#[test]
fn invalid_config_surfaces_startup_error() {
    let temp = Project::with_config("[device]\nbackend = \"quantum\"\n");

    temp.dg()
        .args(&["daemon", "start"])
        .fails()
        .stderr_has("Failed to start daemon")
        .stderr_has("invalid config");
}
