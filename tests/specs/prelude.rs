//! Shared helpers for CLI specs
//!
//! Every `Project` gets its own state and socket directories, so specs never
//! share a daemon. Dropping a `Project` stops its daemon.

use std::path::PathBuf;
use std::process::Output;

use tempfile::TempDir;

pub use serde_json::json;
pub use similar_asserts::assert_eq;

pub struct Project {
    dir: TempDir,
}

impl Project {
    /// No config file: simulated device 0
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `toml` as the gate config before anything starts
    pub fn with_config(toml: &str) -> Self {
        let project = Self::empty();
        std::fs::create_dir_all(project.state_dir()).unwrap();
        std::fs::write(project.state_dir().join("config.toml"), toml).unwrap();
        project
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    pub fn socket_dir(&self) -> PathBuf {
        self.dir.path().join("sock")
    }

    pub fn dg(&self) -> CliBuilder {
        let mut cmd = assert_cmd::Command::cargo_bin("dg").unwrap();
        cmd.env("DG_STATE_DIR", self.state_dir())
            .env("DG_SOCKET_DIR", self.socket_dir())
            .env("DG_DAEMON_BINARY", assert_cmd::cargo::cargo_bin("dgd"))
            .env("DG_TIMEOUT_CONNECT_MS", "10000")
            .env_remove("DG_CONFIG")
            .env_remove("RUST_LOG");
        CliBuilder { cmd }
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        let _ = self.dg().args(&["daemon", "stop"]).cmd.output();
    }
}

pub struct CliBuilder {
    cmd: assert_cmd::Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    /// Run and expect exit code 0
    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        assert!(
            output.status.success(),
            "expected success, got {}\nstdout:\n{}\nstderr:\n{}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        RunAssert { output }
    }

    /// Run and expect a non-zero exit code
    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        assert!(
            !output.status.success(),
            "expected failure\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout),
        );
        RunAssert { output }
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain {:?}:\n{}",
            expected,
            stdout
        );
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain {:?}:\n{}",
            expected,
            stderr
        );
        self
    }

    /// Parse stdout as JSON (for `-o json`)
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.output.stdout).unwrap()
    }
}
