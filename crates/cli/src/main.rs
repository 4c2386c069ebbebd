// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! eos - a local service supervisor CLI.

mod client;
mod color;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use client::DaemonClient;
use commands::{catalog, lifecycle, logs};

#[derive(Parser)]
#[command(name = "eos", version, about = "Local service supervisor", styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a service in the catalog
    Register(catalog::RegisterArgs),
    /// Update a registered service's directory or config file name
    Update(catalog::UpdateArgs),
    /// Remove a service from the catalog
    Unregister(catalog::NameArgs),
    /// Check whether a service is registered
    IsRegistered(catalog::NameArgs),
    /// List all registered services
    List,
    /// Show a service's catalog entry, runtime counters, and current process
    Get(catalog::NameArgs),

    /// Start a registered service
    Start(lifecycle::NameArgs),
    /// Stop, then start, a running service
    Restart(lifecycle::TimedArgs),
    /// Gracefully stop a running service (SIGTERM, then wait)
    Stop(lifecycle::TimedArgs),
    /// Forcefully stop a running service (SIGKILL)
    ForceStop(lifecycle::NameArgs),

    /// Print the path to a service's log file
    LogPath(logs::LogPathArgs),
    /// Print the trailing lines of a service's log file
    Tail(logs::TailArgs),
    /// Create empty log files for a service ahead of its first start
    CreateLogs(catalog::NameArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::connect()?;

    match cli.command {
        Commands::Register(args) => catalog::register(&client, args).await,
        Commands::Update(args) => catalog::update(&client, args).await,
        Commands::Unregister(args) => catalog::unregister(&client, args).await,
        Commands::IsRegistered(args) => catalog::is_registered(&client, args).await,
        Commands::List => catalog::list(&client).await,
        Commands::Get(args) => catalog::get(&client, args).await,

        Commands::Start(args) => lifecycle::start(&client, args).await,
        Commands::Restart(args) => lifecycle::restart(&client, args).await,
        Commands::Stop(args) => lifecycle::stop(&client, args).await,
        Commands::ForceStop(args) => lifecycle::force_stop(&client, args).await,

        Commands::LogPath(args) => logs::path(&client, args).await,
        Commands::Tail(args) => logs::tail(&client, args).await,
        Commands::CreateLogs(args) => logs::create(&client, args).await,
    }
}
