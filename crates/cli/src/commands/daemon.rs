// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon management commands

use anyhow::Result;
use clap::Subcommand;

use crate::client::{self, ClientError, DaemonClient, DaemonPaths};

#[derive(clap::Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon in the background
    Start {
        /// Run in the foreground instead (logs still go to the log file)
        #[arg(long)]
        foreground: bool,
    },
    /// Stop the daemon, letting the running request finish
    Stop,
    /// Show whether the daemon is running
    Status,
}

pub async fn daemon(args: DaemonArgs) -> Result<()> {
    let paths = DaemonPaths::from_env()?;
    match args.command {
        DaemonCommand::Start { foreground } => start(&paths, foreground).await,
        DaemonCommand::Stop => stop(&paths).await,
        DaemonCommand::Status => status(&paths).await,
    }
}

async fn start(paths: &DaemonPaths, foreground: bool) -> Result<()> {
    if let Ok(client) = DaemonClient::connect(paths) {
        if client.hello().await.is_ok() {
            println!("Daemon already running");
            return Ok(());
        }
    }

    if foreground {
        let status = tokio::process::Command::new(client::find_dgd_binary())
            .status()
            .await?;
        if !status.success() {
            anyhow::bail!("dgd exited with {}", status);
        }
        return Ok(());
    }

    DaemonClient::connect_or_start(paths).await?;
    println!("Daemon started");
    Ok(())
}

async fn stop(paths: &DaemonPaths) -> Result<()> {
    if client::daemon_stop(paths).await? {
        println!("Daemon stopped");
    } else {
        println!("Daemon not running");
    }
    Ok(())
}

async fn status(paths: &DaemonPaths) -> Result<()> {
    let client = match DaemonClient::connect(paths) {
        Ok(client) => client,
        Err(ClientError::DaemonNotRunning) => {
            println!("Daemon not running");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let (uptime_secs, total_requests, currently_waiting) = match client.status().await {
        Ok(status) => status,
        Err(ClientError::Io(_)) => {
            // Socket left behind by a daemon that did not shut down cleanly
            println!("Daemon not running (stale socket)");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let version = client.hello().await?;

    println!("Daemon running");
    if let Some(pid) = client::read_daemon_pid(paths) {
        println!("  pid:       {}", pid);
    }
    println!("  version:   {}", version);
    println!("  uptime:    {}s", uptime_secs);
    println!("  socket:    {}", paths.socket_path().display());
    println!("  requests:  {} done, {} waiting", total_requests, currently_waiting);
    Ok(())
}
