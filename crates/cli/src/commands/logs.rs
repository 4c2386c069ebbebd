// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `eos logs` — resolve and print (or tail) a service's stdout/stderr log
//! file path (§4.4 `GetServiceLogFilePath` / `CreateServiceLogFiles`).

use std::io::{Read, Seek, SeekFrom};

use anyhow::{Context, Result};
use clap::Args;

use crate::client::DaemonClient;

#[derive(Args)]
pub struct LogPathArgs {
    pub name: String,
    /// Print the stderr log path instead of stdout
    #[arg(long)]
    pub error: bool,
}

pub async fn path(client: &DaemonClient, args: LogPathArgs) -> Result<()> {
    let path = client
        .log_file_path(&args.name, args.error)
        .await
        .with_context(|| format!("resolving log path for {}", args.name))?;
    println!("{}", path.display());
    Ok(())
}

#[derive(Args)]
pub struct TailArgs {
    pub name: String,
    #[arg(long)]
    pub error: bool,
    /// Number of trailing lines to print
    #[arg(long, short = 'n', default_value_t = 50)]
    pub lines: usize,
}

pub async fn tail(client: &DaemonClient, args: TailArgs) -> Result<()> {
    let path = client
        .log_file_path(&args.name, args.error)
        .await
        .with_context(|| format!("resolving log path for {}", args.name))?;
    let mut file =
        std::fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let len = file.metadata()?.len();
    let read_from = len.saturating_sub(256 * 1024);
    file.seek(SeekFrom::Start(read_from))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let tail: Vec<&str> = contents.lines().rev().take(args.lines).collect();
    for line in tail.into_iter().rev() {
        println!("{line}");
    }
    Ok(())
}

pub async fn create(client: &DaemonClient, args: super::catalog::NameArgs) -> Result<()> {
    client
        .create_service_logs(&args.name)
        .await
        .with_context(|| format!("creating log files for {}", args.name))?;
    println!("created log files for {}", args.name);
    Ok(())
}
