// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start/Restart/Stop/ForceStop primitives. No periodic behavior lives
//! here; the health monitor owns ticking.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eos_adapters::{build_environment, is_alive, open_service_log, send_signal, spawn_service, validate_runtime, SignalOutcome};
use eos_core::{
    Clock, ProcessState, ProcessUpdate, RuntimeUpdate, ServiceConfig, SystemClock,
};
use eos_store::Store;
use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;
use crate::manager::ServiceManager;

const FORCE_STOP_GRACE: Duration = Duration::from_millis(500);
const FORCE_STOP_TICK: Duration = Duration::from_millis(50);

/// Result of a graceful or forced stop.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct StopOutcome {
    pub stopped: Vec<u32>,
    pub failed: HashMap<u32, String>,
}

pub struct LifecycleEngine<C: Clock = SystemClock> {
    store: Arc<dyn Store>,
    clock: C,
    base_dir: PathBuf,
    home_dir: Option<PathBuf>,
    path_env: Option<String>,
}

impl<C: Clock> LifecycleEngine<C> {
    pub fn new(store: Arc<dyn Store>, clock: C, base_dir: PathBuf) -> Self {
        Self {
            store,
            clock,
            base_dir,
            home_dir: dirs::home_dir(),
            path_env: std::env::var("PATH").ok(),
        }
    }

    fn out_log_path(&self, name: &str) -> PathBuf {
        self.base_dir.join("logs").join(format!("{name}-out.log"))
    }

    fn error_log_path(&self, name: &str) -> PathBuf {
        self.base_dir
            .join("logs")
            .join(format!("{name}-error.log"))
    }

    /// Start a registered service. Returns the spawned PID.
    pub async fn start(&self, name: &str) -> Result<u32, LifecycleError> {
        let catalog = self
            .store
            .get_catalog(name)
            .map_err(|_| LifecycleError::NotFound(name.to_string()))?;

        let config = ServiceConfig::load(&catalog.config_path())
            .map_err(|err| LifecycleError::invalid_config(name, err.to_string()))?;

        if let Ok(()) = self.store.get_runtime(name).map(|_| ()) {
            let history = self.store.list_processes_by_name(name);
            if let Some(entry) = eos_core::most_recent_process(&history) {
                match entry.state {
                    ProcessState::Starting => {
                        return Err(LifecycleError::AlreadyStarting {
                            name: name.to_string(),
                            pid: entry.pid,
                        });
                    }
                    ProcessState::Running => {
                        if is_alive(entry.pid) {
                            return Err(LifecycleError::AlreadyRunning {
                                name: name.to_string(),
                                pid: entry.pid,
                            });
                        }
                        // Stale Running record: PID is dead, proceed to spawn.
                    }
                    ProcessState::Unknown | ProcessState::Stopped | ProcessState::Failed => {}
                }
            }
        }

        let runtime_path = validate_runtime(
            &config.runtime,
            self.home_dir.as_deref(),
            self.path_env.as_deref(),
        )
        .map_err(|err| LifecycleError::RuntimeInvalid {
            name: name.to_string(),
            reason: err.to_string(),
        })?;

        let stdout = open_service_log(&self.out_log_path(name))?;
        let stderr = open_service_log(&self.error_log_path(name))?;

        let env = build_environment(
            std::env::vars().collect(),
            runtime_path.as_deref(),
            config.port,
        );

        let pid = spawn_service(&config.command, &catalog.directory_path, &env, stdout, stderr)
            .map_err(|err| LifecycleError::SpawnFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })?;

        let now = self.clock.now();
        if let Err(err) = self.commit_spawn(name, pid, now, None) {
            return Err(self.rollback_spawn(pid, err));
        }

        Ok(pid)
    }

    /// Restart a service that already has a runtime record: stop it, then
    /// spawn again, incrementing `restart_count` in the same partial update.
    pub async fn restart(
        &self,
        name: &str,
        grace_period: Duration,
        tick_period: Duration,
    ) -> Result<u32, LifecycleError> {
        let catalog = self
            .store
            .get_catalog(name)
            .map_err(|_| LifecycleError::NotFound(name.to_string()))?;

        let config = ServiceConfig::load(&catalog.config_path())
            .map_err(|err| LifecycleError::invalid_config(name, err.to_string()))?;

        let runtime = self
            .store
            .get_runtime(name)
            .map_err(|_| LifecycleError::NotRunning(name.to_string()))?;

        let stop_result = self.stop_graceful(name, grace_period, tick_period).await?;
        if !stop_result.failed.is_empty() {
            return Err(LifecycleError::SpawnFailed {
                name: name.to_string(),
                reason: format!(
                    "failed to stop existing process(es) before restart: {:?}",
                    stop_result.failed
                ),
            });
        }

        let runtime_path = validate_runtime(
            &config.runtime,
            self.home_dir.as_deref(),
            self.path_env.as_deref(),
        )
        .map_err(|err| LifecycleError::RuntimeInvalid {
            name: name.to_string(),
            reason: err.to_string(),
        })?;

        let stdout = open_service_log(&self.out_log_path(name))?;
        let stderr = open_service_log(&self.error_log_path(name))?;

        let env = build_environment(
            std::env::vars().collect(),
            runtime_path.as_deref(),
            config.port,
        );

        let pid = spawn_service(&config.command, &catalog.directory_path, &env, stdout, stderr)
            .map_err(|err| LifecycleError::SpawnFailed {
                name: name.to_string(),
                reason: err.to_string(),
            })?;

        let now = self.clock.now();
        let next_restart_count = runtime.restart_count + 1;
        if let Err(err) = self.commit_spawn(name, pid, now, Some(next_restart_count)) {
            return Err(self.rollback_spawn(pid, err));
        }

        Ok(pid)
    }

    /// Record the spawn into the Store: upsert runtime, register and
    /// advance process history. `restart_count` is only touched when
    /// `Some`, i.e. on a restart.
    fn commit_spawn(
        &self,
        name: &str,
        pid: u32,
        now: chrono::DateTime<chrono::Utc>,
        restart_count: Option<u32>,
    ) -> Result<(), LifecycleError> {
        if restart_count.is_none() {
            self.store.register_runtime(name)?;
        }
        self.store.update_runtime(
            name,
            RuntimeUpdate {
                restart_count,
                started_at: Some(now),
                ..Default::default()
            },
        )?;
        self.store.register_process(pid, name, ProcessState::Unknown);
        self.store.update_process(
            pid,
            ProcessUpdate {
                state: Some(ProcessState::Starting),
                started_at: Some(now),
                ..Default::default()
            },
        )?;
        Ok(())
    }

    /// A Store write after spawn failed: kill the orphaned child and
    /// surface a compound error naming both failures.
    fn rollback_spawn(&self, pid: u32, original: LifecycleError) -> LifecycleError {
        match send_signal(pid, Signal::SIGKILL) {
            Ok(_) => LifecycleError::compound(original, "spawn rolled back: process killed"),
            Err(kill_err) => LifecycleError::compound(
                original,
                format!("manual intervention required: kill also failed: {kill_err}"),
            ),
        }
    }

    /// Graceful stop: SIGTERM, then poll for termination up to `grace_period`.
    pub async fn stop_graceful(
        &self,
        name: &str,
        grace_period: Duration,
        tick_period: Duration,
    ) -> Result<StopOutcome, LifecycleError> {
        self.signal_and_wait(name, Signal::SIGTERM, grace_period, tick_period)
            .await
    }

    /// Force stop: SIGKILL, then a short implicit wait.
    pub async fn force_stop(&self, name: &str) -> Result<StopOutcome, LifecycleError> {
        self.signal_and_wait(name, Signal::SIGKILL, FORCE_STOP_GRACE, FORCE_STOP_TICK)
            .await
    }

    async fn signal_and_wait(
        &self,
        name: &str,
        signal: Signal,
        grace_period: Duration,
        tick_period: Duration,
    ) -> Result<StopOutcome, LifecycleError> {
        let history = self.store.list_processes_by_name(name);
        let targets: Vec<u32> = history
            .into_iter()
            .filter(|entry| matches!(entry.state, ProcessState::Running | ProcessState::Starting))
            .map(|entry| entry.pid)
            .collect();

        let mut outcome = StopOutcome::default();
        let mut pending = Vec::new();

        for pid in targets {
            match send_signal(pid, signal) {
                Ok(SignalOutcome::NoSuchProcess) => {
                    self.mark_stopped(pid)?;
                    outcome.stopped.push(pid);
                }
                Ok(SignalOutcome::Delivered) => pending.push(pid),
                Err(err) => {
                    outcome.failed.insert(pid, err.to_string());
                }
            }
        }

        let deadline = std::time::Instant::now() + grace_period;
        loop {
            let (dead, alive): (Vec<u32>, Vec<u32>) =
                pending.into_iter().partition(|&pid| !is_alive(pid));
            for pid in dead {
                self.mark_stopped(pid)?;
                outcome.stopped.push(pid);
            }
            pending = alive;
            if pending.is_empty() || std::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(tick_period).await;
        }

        for pid in pending {
            outcome
                .failed
                .insert(pid, "stop timed out after grace period".to_string());
        }

        Ok(outcome)
    }

    fn mark_stopped(&self, pid: u32) -> Result<(), LifecycleError> {
        let now = self.clock.now();
        self.store
            .update_process(
                pid,
                ProcessUpdate {
                    state: Some(ProcessState::Stopped),
                    stopped_at: Some(now),
                    ..Default::default()
                },
            )
            .or_else(|err| match err {
                eos_store::StoreError::EmptyUpdate => Ok(()),
                other => Err(other),
            })?;
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> ServiceManager for LifecycleEngine<C> {
    async fn restart(
        &self,
        name: &str,
        grace_period: Duration,
        tick_period: Duration,
    ) -> Result<u32, LifecycleError> {
        LifecycleEngine::restart(self, name, grace_period, tick_period).await
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
