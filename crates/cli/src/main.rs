// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dg - Device Gate CLI

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{daemon, device, exec, ops, stats};

use crate::client::{DaemonClient, DaemonPaths};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "dg",
    version,
    about = "Device Gate - fair, exclusive access to a single accelerator"
)]
struct Cli {
    /// Output format
    #[arg(long, short, global = true, value_enum, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an operation with exclusive use of the device
    Exec(exec::ExecArgs),
    /// Show request counters
    Stats,
    /// Device management
    Device(device::DeviceArgs),
    /// List supported operations and their parameters
    Ops,
    /// Daemon management
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    // Handle daemon command separately (doesn't need client connection)
    let command = match cli.command {
        Commands::Daemon(args) => return daemon::daemon(args).await,
        command => command,
    };

    // All other commands go through the daemon
    let paths = DaemonPaths::from_env()?;
    let client = DaemonClient::connect_or_start(&paths).await?;

    match command {
        Commands::Exec(args) => exec::handle(args, &client, cli.output).await,
        Commands::Stats => stats::handle(&client, cli.output).await,
        Commands::Device(args) => device::handle(args, &client, cli.output).await,
        Commands::Ops => ops::handle(&client, cli.output).await,
        Commands::Daemon(_) => Ok(()),
    }
}

/// Diagnostics go to stderr so they never mix with command output
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
