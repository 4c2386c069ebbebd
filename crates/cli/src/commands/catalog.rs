// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `eos register` / `unregister` / `update` / `list` / `get` / `is-registered`
//! — the service catalog CRUD surface (§4.1).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::color;

#[derive(Args)]
pub struct RegisterArgs {
    /// Unique service name
    pub name: String,
    /// Absolute directory the service's config and working directory live in
    pub directory: PathBuf,
    /// Name of the config file within `directory`
    #[arg(long, default_value = "service.yaml")]
    pub config_file: String,
}

pub async fn register(client: &DaemonClient, args: RegisterArgs) -> Result<()> {
    let directory = args
        .directory
        .canonicalize()
        .unwrap_or(args.directory.clone());
    let entry = client
        .register(&args.name, directory, &args.config_file)
        .await
        .with_context(|| format!("registering service {}", args.name))?;
    println!(
        "registered {} at {}",
        entry.name,
        entry.directory_path.display()
    );
    Ok(())
}

#[derive(Args)]
pub struct UpdateArgs {
    pub name: String,
    #[arg(long)]
    pub directory: PathBuf,
    #[arg(long, default_value = "service.yaml")]
    pub config_file: String,
}

pub async fn update(client: &DaemonClient, args: UpdateArgs) -> Result<()> {
    let entry = client
        .update_catalog(
            &args.name,
            args.directory.display().to_string(),
            args.config_file,
        )
        .await
        .with_context(|| format!("updating service {}", args.name))?;
    println!(
        "updated {} -> {}",
        entry.name,
        entry.directory_path.display()
    );
    Ok(())
}

#[derive(Args)]
pub struct NameArgs {
    pub name: String,
}

pub async fn unregister(client: &DaemonClient, args: NameArgs) -> Result<()> {
    let removed = client.unregister(&args.name).await?;
    if removed {
        println!("unregistered {}", args.name);
    } else {
        println!("{} was not registered", args.name);
    }
    Ok(())
}

pub async fn is_registered(client: &DaemonClient, args: NameArgs) -> Result<()> {
    let registered = client.is_registered(&args.name).await?;
    println!("{registered}");
    Ok(())
}

pub async fn list(client: &DaemonClient) -> Result<()> {
    let entries = client.list_catalog().await?;
    if entries.is_empty() {
        println!("no services registered");
        return Ok(());
    }
    for entry in entries {
        println!("{}\t{}", entry.name, entry.directory_path.display());
    }
    Ok(())
}

pub async fn get(client: &DaemonClient, args: NameArgs) -> Result<()> {
    let instance = client.get_service_instance(&args.name).await?;
    println!(
        "{}\t{}",
        instance.catalog.name,
        instance.catalog.directory_path.display()
    );
    match instance.process {
        Some(process) => {
            println!("  pid {}\t{}", process.pid, color::state_label(process.state));
            if let Some(error) = process.error {
                println!("  error: {error}");
            }
        }
        None => println!("  not running"),
    }
    if let Some(runtime) = instance.runtime {
        println!("  restart_count: {}", runtime.restart_count);
    }
    Ok(())
}
