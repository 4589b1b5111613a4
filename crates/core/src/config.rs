// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gate configuration
//!
//! Loaded from an optional TOML file. Every field has a default, so a missing
//! file and an empty file mean the same thing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which device adapter backs the gate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceBackend {
    /// In-process device, no hardware
    #[default]
    Simulated,
    /// Open, close and reset by running external commands
    Command,
}

impl DeviceBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceBackend::Simulated => "simulated",
            DeviceBackend::Command => "command",
        }
    }
}

/// Device section
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub id: u32,
    pub name: String,
    /// Machine type reported by machine info
    pub machine: String,
    pub backend: DeviceBackend,
    /// Simulated open latency
    #[serde(with = "humantime_serde")]
    pub open_latency: Duration,
    pub open_command: Vec<String>,
    pub close_command: Vec<String>,
    /// `{id}` is replaced with the device id
    pub reset_command: Vec<String>,
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
    /// Checkout of the device software whose latest commit is reported
    pub software_dir: Option<PathBuf>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: 0,
            name: "simulated".to_string(),
            machine: "simulated-n150".to_string(),
            backend: DeviceBackend::Simulated,
            open_latency: Duration::ZERO,
            open_command: Vec::new(),
            close_command: Vec::new(),
            reset_command: vec!["tt-smi".to_string(), "-r".to_string(), "{id}".to_string()],
            command_timeout: Duration::from_secs(30),
            software_dir: None,
        }
    }
}

impl DeviceConfig {
    /// Reset command with the device id substituted
    pub fn resolved_reset_command(&self) -> Vec<String> {
        let id = self.id.to_string();
        self.reset_command
            .iter()
            .map(|arg| arg.replace("{id}", &id))
            .collect()
    }
}

/// Server section
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Bound on reading a request and writing its response
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Top-level configuration file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    pub device: DeviceConfig,
    pub server: ServerConfig,
}

impl GateConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GateConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.device.backend == DeviceBackend::Command {
            if self.device.open_command.is_empty() {
                return Err(ConfigError::Invalid(
                    "command backend requires device.open_command".to_string(),
                ));
            }
            if self.device.close_command.is_empty() {
                return Err(ConfigError::Invalid(
                    "command backend requires device.close_command".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
