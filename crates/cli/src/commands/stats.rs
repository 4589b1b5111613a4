// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request counters kept by the daemon

use std::fmt;

use anyhow::{bail, Result};
use dg_daemon::Response;
use serde::Serialize;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, PartialEq)]
pub struct Stats {
    pub total_requests: u64,
    pub currently_waiting: u64,
    pub max_wait_time_seconds: f64,
    pub close_failures: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total_requests:    {}", self.total_requests)?;
        writeln!(f, "currently_waiting: {}", self.currently_waiting)?;
        writeln!(f, "max_wait_time:     {:.3}s", self.max_wait_time_seconds)?;
        write!(f, "close_failures:    {}", self.close_failures)
    }
}

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let Response::Stats {
        total_requests,
        currently_waiting,
        max_wait_time_seconds,
        close_failures,
    } = client.stats().await?
    else {
        bail!("unexpected response from daemon");
    };
    output::print(
        &Stats {
            total_requests,
            currently_waiting,
            max_wait_time_seconds,
            close_failures,
        },
        format,
    );
    Ok(())
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
