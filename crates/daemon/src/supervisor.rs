// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup, shutdown, and the SIGCHLD-adjacent reap loop (§4.5).

use std::sync::Arc;
use std::time::Duration;

use eos_adapters::{DaemonLogger, PidLock, PidLockError};
use eos_core::{ProcessUpdate, SystemClock};
use eos_lifecycle::LifecycleEngine;
use eos_store::{MemoryStore, Store};
use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::warn;

use crate::config::{Config, MAX_LOG_SIZE};

/// Poll interval for the child-reap loop. 100ms matches §9's suggested
/// substitute for platforms without async `SIGCHLD` delivery; we poll
/// unconditionally because spawned children are plain `std::process::Child`
/// handles dropped immediately after spawn (see `eos-adapters::spawn_service`),
/// so there is no live handle left to `.wait()` on.
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("could not determine state directory")]
    NoStateDir,

    #[error("another instance is already running with pid {0}")]
    LockFailed(u32),

    #[error("failed to bind socket at {path}: {source}")]
    BindFailed {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] eos_store::StoreError),

    #[error("logger error: {0}")]
    Logger(#[from] eos_adapters::LoggerError),
}

impl From<PidLockError> for DaemonError {
    fn from(err: PidLockError) -> Self {
        match err {
            PidLockError::AlreadyRunning(pid) => DaemonError::LockFailed(pid),
            PidLockError::Corrupt(contents) => DaemonError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("corrupt pid file contents: {contents:?}"),
            )),
            PidLockError::Io(err) => DaemonError::Io(err),
        }
    }
}

/// Everything the running daemon owns: the PID lock, the Store, the
/// lifecycle engine, and the daemon log.
pub struct DaemonState {
    pub config: Config,
    pid_lock: PidLock,
    pub store: Arc<dyn Store>,
    pub engine: Arc<LifecycleEngine<SystemClock>>,
    pub logger: Arc<DaemonLogger>,
}

pub struct StartupResult {
    pub daemon: DaemonState,
    pub listener: UnixListener,
}

impl DaemonState {
    /// Orderly shutdown (§4.5 step 7): remove the socket, release the PID
    /// lock. The Store is an in-memory table owned by this value; dropping
    /// it closes it.
    pub fn shutdown(self) -> Result<(), DaemonError> {
        if self.config.socket_path.exists() {
            std::fs::remove_file(&self.config.socket_path)?;
        }
        self.pid_lock.release()?;
        Ok(())
    }
}

/// Run the full startup sequence, cleaning up partial state on any failure
/// except a failed lock acquisition (those files belong to the already
/// running daemon and must not be touched).
pub async fn startup(config: &Config) -> Result<StartupResult, DaemonError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(err) => {
            if !matches!(err, DaemonError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(err)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, DaemonError> {
    // 1. Create the state directory.
    std::fs::create_dir_all(&config.base_dir)?;

    // 2. Acquire the single-instance PID lock before anything else touches
    // the state directory's contents.
    let pid_lock = PidLock::acquire(&config.pid_path)?;

    // 3. Create subdirectories.
    std::fs::create_dir_all(config.logs_dir())?;

    // 4. Open the Store and DaemonLogger.
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let logger = Arc::new(DaemonLogger::open(&config.log_path, MAX_LOG_SIZE)?);
    let engine = Arc::new(LifecycleEngine::new(
        Arc::clone(&store),
        SystemClock,
        config.base_dir.clone(),
    ));

    // 5. Remove a stale socket file, then bind last, only once everything
    // above has succeeded.
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener =
        UnixListener::bind(&config.socket_path).map_err(|source| DaemonError::BindFailed {
            path: config.socket_path.clone(),
            source,
        })?;

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            pid_lock,
            store,
            engine,
            logger,
        },
        listener,
    })
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.pid_path.exists() {
        let _ = std::fs::remove_file(&config.pid_path);
    }
}

/// Run the child-reap loop until `stop` is notified (§4.5 step 6).
pub async fn reap_loop(store: Arc<dyn Store>, stop: Arc<Notify>) {
    let mut interval = tokio::time::interval(REAP_POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => reap_once(&store),
            _ = stop.notified() => return,
        }
    }
}

/// Drain every exited child without blocking. Any PID this process did not
/// spawn is not in `Store`; `update_process` then fails with `NotFound` or
/// `EmptyUpdate`, which is swallowed since there is nothing to reconcile.
fn reap_once(store: &Arc<dyn Store>) {
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::Exited(pid, code)) => {
                reconcile_exit(store, pid.as_raw() as u32, code == 0);
            }
            Ok(WaitStatus::Signaled(pid, _, _)) => {
                reconcile_exit(store, pid.as_raw() as u32, false);
            }
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
            Ok(_) => continue,
            Err(_) => break,
        }
    }
}

fn reconcile_exit(store: &Arc<dyn Store>, pid: u32, clean: bool) {
    let now = chrono::Utc::now();
    let update = if clean {
        ProcessUpdate {
            state: Some(eos_core::ProcessState::Stopped),
            stopped_at: Some(now),
            ..Default::default()
        }
    } else {
        ProcessUpdate {
            state: Some(eos_core::ProcessState::Failed),
            error: Some(Some("Zombie process has been reaped".to_string())),
            stopped_at: Some(now),
            ..Default::default()
        }
    };
    if let Err(err) = store.update_process(pid, update) {
        match err {
            eos_store::StoreError::NotFound(_) | eos_store::StoreError::EmptyUpdate => {}
            other => warn!(pid, error = %other, "failed to reconcile reaped child"),
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
