// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dg_adapters::{ConfiguredDevice, GitProvenance, TracedDevice};
use dg_core::{ConfigError, GateConfig, UuidIdGen};
use dg_engine::ExclusiveDevice;
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::server::ServerContext;

/// Device type served by the daemon (wrapped with tracing)
pub type DaemonDevice = TracedDevice<ConfiguredDevice>;

/// How long shutdown waits for the device holder, and then for open
/// connections, to finish
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
const DRAIN_POLL: Duration = Duration::from_millis(20);

/// Daemon paths, resolved from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding pid, version, log and config files
    pub state_dir: PathBuf,
    /// Directory holding the socket
    pub socket_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to version file
    pub version_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Gate configuration file (may not exist)
    pub config_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        let config_path = std::env::var("DG_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| state_dir.join("config.toml"));

        Ok(Self {
            socket_dir: socket_dir(),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            config_path,
            state_dir,
        })
    }

    /// Socket for the device with `device_id`
    pub fn socket_path(&self, device_id: u32) -> PathBuf {
        self.socket_dir.join(format!("device-{}.sock", device_id))
    }
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    /// Where the listener is bound
    pub socket_path: PathBuf,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    /// Shared with every connection task
    pub context: Arc<ServerContext<DaemonDevice, UuidIdGen>>,
    /// One task per accepted connection
    pub connections: JoinSet<()>,
}

impl DaemonState {
    /// Shutdown the daemon gracefully
    ///
    /// Queued requests are abandoned; the request holding the device, if any,
    /// gets [`DRAIN_TIMEOUT`] to finish so the device is closed. Connection
    /// tasks then get the same bound to write their responses.
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        // 1. Refuse new requests and abandon the queue
        self.context.device.shutdown();

        // 2. Let the holder close the device
        let start = std::time::Instant::now();
        while self.context.device.status().holder.is_some() {
            if start.elapsed() >= DRAIN_TIMEOUT {
                warn!("Device still held after {:?}, exiting anyway", DRAIN_TIMEOUT);
                break;
            }
            tokio::time::sleep(DRAIN_POLL).await;
        }

        // 3. Let connection tasks deliver their responses
        let connections = &mut self.connections;
        let drain = async move { while connections.join_next().await.is_some() {} };
        if tokio::time::timeout(DRAIN_TIMEOUT, drain).await.is_err() {
            warn!(
                remaining = self.connections.len(),
                "Connections still open after {:?}, aborting", DRAIN_TIMEOUT
            );
            self.connections.abort_all();
        }

        // 4. Remove socket file
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        // 5. Remove PID file
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        // 6. Remove version file
        if self.config.version_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.version_path) {
                warn!("Failed to remove version file: {}", e);
            }
        }

        // 7. Lock file is released automatically when self.lock_file is dropped

        let snap = self.context.device.telemetry();
        info!(
            total_requests = snap.total_requests,
            max_wait_ms = snap.max_wait_time.as_millis() as u64,
            close_failures = snap.close_failures,
            "Daemon shutdown complete"
        );
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        // The files belong to the daemon holding the lock
        Err(e @ LifecycleError::LockFailed(_)) => Err(e),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create state and socket directories
    std::fs::create_dir_all(&config.state_dir)?;
    std::fs::create_dir_all(&config.socket_dir)?;

    // 2. Acquire lock file FIRST - prevents races. Not truncated until locked,
    // so a losing daemon cannot clobber the winner's PID.
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file
    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // Write version file
    std::fs::write(&config.version_path, env!("CARGO_PKG_VERSION"))?;

    // 3. Load gate config BEFORE binding socket (fail fast, don't accept connections if invalid)
    let gate = GateConfig::load(&config.config_path)?;

    // 4. Set up the device (wrapped with tracing for observability)
    let adapter = ConfiguredDevice::from_config(&gate.device);
    let backend = adapter.backend().as_str();
    info!(
        device_id = gate.device.id,
        name = %gate.device.name,
        backend,
        "Device configured"
    );
    let device = ExclusiveDevice::new(TracedDevice::new(adapter));

    // 5. Remove stale socket and bind (LAST - only after all validation passes)
    let socket_path = config.socket_path(gate.device.id);
    if socket_path.exists() {
        std::fs::remove_file(&socket_path)?;
    }
    let listener = UnixListener::bind(&socket_path)
        .map_err(|e| LifecycleError::BindFailed(socket_path.clone(), e))?;

    info!("Daemon started, state in {}", config.state_dir.display());

    Ok(DaemonState {
        config: config.clone(),
        socket_path,
        lock_file,
        listener,
        context: Arc::new(
            ServerContext::new(device, UuidIdGen, gate.server)
                .with_backend(backend)
                .with_software(gate.device.software_dir.map(GitProvenance::new)),
        ),
        connections: JoinSet::new(),
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    // Remove version file
    if config.version_path.exists() {
        let _ = std::fs::remove_file(&config.version_path);
    }

    // Remove PID/lock file
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

/// Get the state directory for devgate
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("DG_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }

    // Use XDG_STATE_HOME or default to ~/.local/state
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("devgate"));
    }

    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/devgate"))
}

/// Get the socket directory for devgate
///
/// Uses /tmp/devgate by default to keep paths short (macOS SUN_LEN = 104).
/// Can be overridden with DG_SOCKET_DIR for testing.
fn socket_dir() -> PathBuf {
    std::env::var("DG_SOCKET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/devgate"))
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
