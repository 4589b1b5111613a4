// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device driven by external commands
//!
//! Open, close and reset each run a configured argv. A non-zero exit or a
//! command exceeding its timeout is a failure of that step.

use super::{DeviceAdapter, DeviceError, DeviceHandle, DeviceInfo};
use async_trait::async_trait;
use dg_core::DeviceConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// Command-driven device adapter
#[derive(Clone)]
pub struct CommandDevice {
    info: DeviceInfo,
    open_command: Vec<String>,
    close_command: Vec<String>,
    reset_command: Vec<String>,
    timeout: Duration,
    sessions: Arc<AtomicU64>,
}

impl CommandDevice {
    pub fn from_config(config: &DeviceConfig) -> Self {
        Self {
            info: DeviceInfo {
                id: config.id,
                name: config.name.clone(),
                machine: config.machine.clone(),
            },
            open_command: config.open_command.clone(),
            close_command: config.close_command.clone(),
            reset_command: config.resolved_reset_command(),
            timeout: config.command_timeout,
            sessions: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `argv`, returning trimmed stdout on success
    async fn run(&self, argv: &[String]) -> Result<String, String> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| "no command configured".to_string())?;

        let output = Command::new(program)
            .args(args)
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, output).await {
            Ok(result) => result.map_err(|e| format!("{}: {}", program, e))?,
            Err(_) => return Err(format!("{} timed out after {:?}", program, self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl DeviceAdapter for CommandDevice {
    fn info(&self) -> DeviceInfo {
        self.info.clone()
    }

    async fn open(&self) -> Result<DeviceHandle, DeviceError> {
        self.run(&self.open_command)
            .await
            .map_err(DeviceError::OpenFailed)?;
        let session = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(DeviceHandle::new(self.info.id, session))
    }

    async fn close(&self, handle: DeviceHandle) -> Result<(), DeviceError> {
        tracing::trace!(session = handle.session(), "closing via command");
        self.run(&self.close_command)
            .await
            .map(|_| ())
            .map_err(DeviceError::CloseFailed)
    }

    async fn reset(&self) -> Result<String, DeviceError> {
        self.run(&self.reset_command)
            .await
            .map_err(DeviceError::ResetFailed)
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
