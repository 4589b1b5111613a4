// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build provenance of the device software
//!
//! Reports the latest commit of the software checkout the device runs, read
//! with `git log`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Bound on one `git log` run
pub const GIT_TIMEOUT: Duration = Duration::from_secs(5);

/// `git log` format: fields separated by `|`, subject last
const LOG_FORMAT: &str = "--format=%H|%h|%cr|%s";

/// Latest commit of the software checkout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareInfo {
    pub full_hash: String,
    pub short_hash: String,
    /// Relative commit time, e.g. "3 days ago"
    pub time_ago: String,
    /// Commit subject
    pub message: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SoftwareError {
    #[error("no software_dir configured")]
    NotConfigured,
    #[error("git failed: {0}")]
    CommandFailed(String),
    #[error("git timed out after {0:?}")]
    Timeout(Duration),
    #[error("could not parse git output: {0:?}")]
    Unparsable(String),
}

/// Reads commit information from a git checkout
#[derive(Clone, Debug)]
pub struct GitProvenance {
    dir: PathBuf,
    timeout: Duration,
}

impl GitProvenance {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            timeout: GIT_TIMEOUT,
        }
    }

    /// Latest commit of the checkout
    pub async fn latest_commit(&self) -> Result<SoftwareInfo, SoftwareError> {
        let output = Command::new("git")
            .current_dir(&self.dir)
            .args(["log", "-1", LOG_FORMAT])
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, output).await {
            Ok(result) => result.map_err(|e| SoftwareError::CommandFailed(e.to_string()))?,
            Err(_) => return Err(SoftwareError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SoftwareError::CommandFailed(stderr.trim().to_string()));
        }

        parse_log_line(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse one line of `git log` output in [`LOG_FORMAT`]
///
/// The subject may itself contain `|`; everything after the third separator
/// belongs to it.
pub fn parse_log_line(line: &str) -> Result<SoftwareInfo, SoftwareError> {
    let line = line.trim();
    let mut parts = line.splitn(4, '|');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(full), Some(short), Some(time_ago), Some(message)) if !full.is_empty() => {
            Ok(SoftwareInfo {
                full_hash: full.to_string(),
                short_hash: short.to_string(),
                time_ago: time_ago.to_string(),
                message: message.to_string(),
            })
        }
        _ => Err(SoftwareError::Unparsable(line.to_string())),
    }
}

#[cfg(test)]
#[path = "software_tests.rs"]
mod tests;
