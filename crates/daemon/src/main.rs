// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `eosd` - the service supervisor daemon.
//!
//! Wires `eos-store`, `eos-lifecycle`, `eos-health`, and this crate's
//! `IpcServer`/supervisor together into the long-lived process described by
//! spec §4.5: single-instance PID lock, socket bind, IpcServer and
//! HealthMonitor on background tasks, a SIGCHLD-adjacent reap loop, and an
//! orderly shutdown on SIGTERM/SIGINT.

use std::process::ExitCode;
use std::sync::Arc;

use eos_daemon::{listener::IpcServer, supervisor, Config, DaemonError};
use eos_health::{HealthMonitor, HealthMonitorConfig};
use tokio::sync::Notify;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    if std::env::args().any(|a| a == "--version" || a == "-V") {
        println!("eosd {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    if std::env::args().any(|a| a == "--help" || a == "-h") {
        println!("eosd - local service supervisor daemon\n\nUSAGE:\n    eosd\n\nConfiguration is read from EOS_STATE_DIR / XDG_STATE_HOME, not flags.");
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("eosd: failed to start async runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run())
}

async fn run() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("eosd: {err}");
            return ExitCode::FAILURE;
        }
    };

    // A startup marker is written synchronously, before the async tracing
    // subscriber exists, so a daemon that dies during `startup()` (bad
    // lock, bind failure) still leaves a human-readable trace even if the
    // non-blocking writer never got to flush.
    write_startup_marker(&config);

    let started = match supervisor::startup(&config).await {
        Ok(started) => started,
        Err(err) => {
            write_startup_error(&config, &err);
            eprintln!("eosd: startup failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    install_tracing(&config);
    info!(base_dir = %config.base_dir.display(), "eosd started");

    let stop = Arc::new(Notify::new());
    let mut tasks = Vec::new();

    let ipc_server = Arc::new(IpcServer::new(
        Arc::clone(&started.daemon.store),
        Arc::clone(&started.daemon.engine),
        config.base_dir.clone(),
    ));
    let listener = started.listener;
    let ipc_stop = Arc::clone(&stop);
    tasks.push(tokio::spawn(
        async move { ipc_server.run(listener, ipc_stop).await },
    ));

    let health_monitor = Arc::new(HealthMonitor::new(
        Arc::clone(&started.daemon.store),
        Arc::clone(&started.daemon.engine) as Arc<dyn eos_lifecycle::ServiceManager>,
        eos_core::SystemClock,
        config.base_dir.clone(),
        HealthMonitorConfig::default(),
    ));
    let health_stop = Arc::clone(&stop);
    tasks.push(tokio::spawn(async move { health_monitor.run(health_stop).await }));

    let reap_store = Arc::clone(&started.daemon.store);
    let reap_stop = Arc::clone(&stop);
    tasks.push(tokio::spawn(
        async move { supervisor::reap_loop(reap_store, reap_stop).await },
    ));

    if let Err(err) = wait_for_shutdown_signal().await {
        error!(error = %err, "failed to install signal handlers");
        stop.notify_waiters();
        for task in tasks {
            let _ = task.await;
        }
        let _ = started.daemon.shutdown();
        return ExitCode::FAILURE;
    }
    info!("received shutdown signal, stopping");
    stop.notify_waiters();

    for task in tasks {
        let _ = task.await;
    }

    if let Err(err) = started.daemon.shutdown() {
        error!(error = %err, "error during shutdown");
        return ExitCode::FAILURE;
    }

    info!("eosd shut down cleanly");
    ExitCode::SUCCESS
}

/// Wait for SIGTERM or SIGINT (§4.5 step 1). On non-Unix targets this
/// falls back to Ctrl-C only.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

fn install_tracing(config: &Config) {
    let file_appender = tracing_appender::rolling::never(
        config.logs_dir(),
        config
            .log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("daemon.log")),
    );
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    // Leak the guard: it must outlive the subscriber, which lives for the
    // whole process, so there is no sound point at which to drop it early.
    std::mem::forget(guard);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

fn write_startup_marker(config: &Config) {
    use std::io::Write;
    if std::fs::create_dir_all(config.logs_dir()).is_err() {
        return;
    }
    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    {
        let _ = writeln!(
            file,
            "[{}] INFO: eosd starting (pid {})",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%3fZ"),
            std::process::id()
        );
    }
}

fn write_startup_error(config: &Config, err: &DaemonError) {
    use std::io::Write;
    if let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    {
        let _ = writeln!(
            file,
            "[{}] ERROR: eosd failed to start: {err}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%3fZ"),
        );
    }
}
