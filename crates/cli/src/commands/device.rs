// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device commands

use std::fmt;

use anyhow::Result;
use clap::Subcommand;
use dg_daemon::{DeviceSummary, SoftwareInfo};
use serde::Serialize;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

#[derive(clap::Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Subcommand)]
pub enum DeviceCommand {
    /// Show whether the device is held and how often it was opened
    Status,
    /// Reset the device after the queued requests finish
    Reset,
    /// Show machine type and device id
    Info,
    /// Show the latest commit of the device software checkout
    Software,
}

#[derive(Serialize)]
struct Status(DeviceSummary);

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.0;
        writeln!(f, "Device {} ({}, {})", d.id, d.name, d.backend)?;
        match d.holder {
            Some(ticket) => writeln!(f, "  held by:  request #{}", ticket)?,
            None => writeln!(f, "  held by:  -")?,
        }
        writeln!(f, "  open:     {}", d.open)?;
        writeln!(f, "  queued:   {}", d.queued)?;
        write!(f, "  opens:    {} (closes: {})", d.opens, d.closes)
    }
}

#[derive(Serialize)]
struct Reset {
    message: String,
}

impl fmt::Display for Reset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.trim().is_empty() {
            write!(f, "Device reset")
        } else {
            write!(f, "Device reset\n{}", self.message.trim_end())
        }
    }
}

#[derive(Serialize)]
struct Machine {
    machine_type: String,
    device_id: u32,
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (device {})", self.machine_type, self.device_id)
    }
}

#[derive(Serialize)]
struct Software(SoftwareInfo);

impl fmt::Display for Software {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.0;
        writeln!(f, "{} {}", s.short_hash, s.message)?;
        writeln!(f, "  commit:   {}", s.full_hash)?;
        write!(f, "  when:     {}", s.time_ago)
    }
}

pub async fn handle(args: DeviceArgs, client: &DaemonClient, format: OutputFormat) -> Result<()> {
    match args.command {
        DeviceCommand::Status => {
            let summary = client.device_status().await?;
            output::print(&Status(summary), format);
        }
        DeviceCommand::Reset => {
            let message = client.device_reset().await?;
            output::print(&Reset { message }, format);
        }
        DeviceCommand::Info => {
            let (machine_type, device_id) = client.machine_info().await?;
            output::print(
                &Machine {
                    machine_type,
                    device_id,
                },
                format,
            );
        }
        DeviceCommand::Software => {
            let software = client.software_info().await?;
            output::print(&Software(software), format);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
