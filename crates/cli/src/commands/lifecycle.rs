// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `eos start` / `restart` / `stop` / `force-stop` — the lifecycle surface
//! over a registered service (§4.2, §4.3).

use anyhow::{Context, Result};
use clap::Args;

use crate::client::DaemonClient;

const DEFAULT_GRACE_PERIOD: &str = "10s";
const DEFAULT_TICKER_PERIOD: &str = "100ms";

#[derive(Args)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Args)]
pub struct TimedArgs {
    pub name: String,
    /// How long to wait for a graceful exit before giving up, e.g. `10s`
    #[arg(long, default_value = DEFAULT_GRACE_PERIOD)]
    pub grace_period: String,
    /// Poll interval while waiting for exit, e.g. `100ms`
    #[arg(long, default_value = DEFAULT_TICKER_PERIOD)]
    pub ticker_period: String,
}

pub async fn start(client: &DaemonClient, args: NameArgs) -> Result<()> {
    let pid = client
        .start(&args.name)
        .await
        .with_context(|| format!("starting {}", args.name))?;
    println!("started {} (pid {pid})", args.name);
    Ok(())
}

pub async fn restart(client: &DaemonClient, args: TimedArgs) -> Result<()> {
    let pid = client
        .restart(&args.name, &args.grace_period, &args.ticker_period)
        .await
        .with_context(|| format!("restarting {}", args.name))?;
    println!("restarted {} (pid {pid})", args.name);
    Ok(())
}

pub async fn stop(client: &DaemonClient, args: TimedArgs) -> Result<()> {
    let outcome = client
        .stop(&args.name, &args.grace_period, &args.ticker_period)
        .await
        .with_context(|| format!("stopping {}", args.name))?;
    report_stop(&args.name, &outcome)
}

pub async fn force_stop(client: &DaemonClient, args: NameArgs) -> Result<()> {
    let outcome = client
        .force_stop(&args.name)
        .await
        .with_context(|| format!("force-stopping {}", args.name))?;
    report_stop(&args.name, &outcome)
}

fn report_stop(name: &str, outcome: &eos_lifecycle::StopOutcome) -> Result<()> {
    for pid in &outcome.stopped {
        println!("{name}: pid {pid} stopped");
    }
    for (pid, reason) in &outcome.failed {
        println!("{name}: pid {pid} did not stop: {reason}");
    }
    if !outcome.failed.is_empty() {
        anyhow::bail!("{} of {} process(es) failed to stop", outcome.failed.len(), outcome.failed.len() + outcome.stopped.len());
    }
    Ok(())
}
