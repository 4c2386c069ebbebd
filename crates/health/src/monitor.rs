// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic tick loop and its five state handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eos_adapters::{is_alive, ServiceLogSink};
use eos_core::{
    most_recent_process, Clock, ProcessHistoryEntry, ProcessState, ProcessUpdate, SystemClock,
};
use eos_lifecycle::ServiceManager;
use eos_store::Store;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::warn;

use crate::backoff::required_delay;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("store error: {0}")]
    Store(#[from] eos_store::StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tunables for the health monitor: a 2s tick, a 30s startup timeout
/// (enabled), and a 5s restart grace period by default.
#[derive(Debug, Clone)]
pub struct HealthMonitorConfig {
    pub check_interval: Duration,
    pub timeout_enable: bool,
    pub timeout_limit: Duration,
    pub max_restart: u32,
    pub restart_grace_period: Duration,
    pub restart_tick_period: Duration,
}

impl Default for HealthMonitorConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(2),
            timeout_enable: true,
            timeout_limit: Duration::from_secs(30),
            max_restart: 5,
            restart_grace_period: Duration::from_secs(5),
            restart_tick_period: Duration::from_millis(200),
        }
    }
}

/// The single periodic loop. Handlers execute sequentially within one
/// tick: a slow restart cannot parallelize with another service's check,
/// which keeps Store contention low and prevents restart storms.
pub struct HealthMonitor<C: Clock = SystemClock> {
    store: Arc<dyn Store>,
    manager: Arc<dyn ServiceManager>,
    clock: C,
    base_dir: PathBuf,
    config: HealthMonitorConfig,
}

impl<C: Clock> HealthMonitor<C> {
    pub fn new(
        store: Arc<dyn Store>,
        manager: Arc<dyn ServiceManager>,
        clock: C,
        base_dir: PathBuf,
        config: HealthMonitorConfig,
    ) -> Self {
        Self {
            store,
            manager,
            clock,
            base_dir,
            config,
        }
    }

    /// Run until `stop` is notified. Either the stop channel or (when
    /// wired by the caller into a `tokio::select!` alongside this future)
    /// context cancellation must cause a prompt return.
    pub async fn run(&self, stop: Arc<Notify>) {
        let mut interval = tokio::time::interval(self.config.check_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick_once().await;
                }
                _ = stop.notified() => {
                    return;
                }
            }
        }
    }

    /// One pass over the catalog. Per-service errors are logged and
    /// swallowed: one broken service must not halt monitoring of the
    /// others.
    pub async fn tick_once(&self) {
        for catalog_entry in self.store.list_catalog() {
            let name = catalog_entry.name;
            if self.store.get_runtime(&name).is_err() {
                continue;
            }
            let history = self.store.list_processes_by_name(&name);
            let Some(entry) = most_recent_process(&history).cloned() else {
                continue;
            };

            let result = match entry.state {
                ProcessState::Starting => self.check_start(&name, &entry).await,
                ProcessState::Running => self.check_running(&name, &entry).await,
                ProcessState::Failed => self.check_failed(&name, &entry).await,
                ProcessState::Unknown => self.check_unknown(&name, &entry).await,
                ProcessState::Stopped => Ok(()),
            };

            if let Err(err) = result {
                warn!(service = %name, error = %err, "health monitor tick failed for service");
            }
        }
    }

    async fn check_start(&self, name: &str, entry: &ProcessHistoryEntry) -> Result<(), HealthError> {
        let now = self.clock.now();

        if !is_alive(entry.pid) {
            self.transition_failed(entry.pid, format!("service {name} died during startup"))?;
            self.append_service_line(name, Stream::Stderr, "service died during startup")?;
            return Ok(());
        }

        if self.config.timeout_enable {
            let started_at = entry.started_at.unwrap_or(entry.created_at);
            if now.signed_duration_since(started_at).to_std().unwrap_or_default()
                > self.config.timeout_limit
            {
                self.transition_failed(
                    entry.pid,
                    format!("service {name} taking too long to start"),
                )?;
                self.append_service_line(
                    name,
                    Stream::Stderr,
                    "service taking too long to start",
                )?;
                return Ok(());
            }
        }

        self.store.update_process(
            entry.pid,
            ProcessUpdate {
                state: Some(ProcessState::Running),
                error: Some(None),
                ..Default::default()
            },
        )?;
        Ok(())
    }

    async fn check_running(&self, name: &str, entry: &ProcessHistoryEntry) -> Result<(), HealthError> {
        if is_alive(entry.pid) {
            return Ok(());
        }
        self.transition_failed(entry.pid, "service is not running".to_string())?;
        self.append_service_line(name, Stream::Stderr, "service is not running")?;
        Ok(())
    }

    async fn check_failed(&self, name: &str, entry: &ProcessHistoryEntry) -> Result<(), HealthError> {
        if is_alive(entry.pid) {
            // False-failure recovery: the process is alive, so the prior
            // Failed classification was wrong. Restore it without
            // touching restart_count.
            self.store.update_process(
                entry.pid,
                ProcessUpdate {
                    state: Some(ProcessState::Running),
                    error: Some(None),
                    ..Default::default()
                },
            )?;
            self.append_service_line(
                name,
                Stream::Stdout,
                &format!("service {name} recovered from a false failure"),
            )?;
            return Ok(());
        }

        let runtime = self.store.get_runtime(name)?;
        let now = self.clock.now();
        let started_at = entry.started_at.unwrap_or(entry.created_at);
        let elapsed = now
            .signed_duration_since(started_at)
            .to_std()
            .unwrap_or_default();
        let required = required_delay(runtime.restart_count);

        if runtime.restart_count < self.config.max_restart && elapsed >= required {
            if let Err(err) = self
                .manager
                .restart(
                    name,
                    self.config.restart_grace_period,
                    self.config.restart_tick_period,
                )
                .await
            {
                warn!(service = %name, error = %err, "restart attempt failed, retrying after backoff");
            }
        }
        Ok(())
    }

    async fn check_unknown(&self, name: &str, entry: &ProcessHistoryEntry) -> Result<(), HealthError> {
        if is_alive(entry.pid) {
            self.store.update_process(
                entry.pid,
                ProcessUpdate {
                    state: Some(ProcessState::Running),
                    error: Some(None),
                    ..Default::default()
                },
            )?;
        } else {
            self.transition_failed(entry.pid, format!("service {name} is not running"))?;
        }
        Ok(())
    }

    fn transition_failed(&self, pid: u32, error: String) -> Result<(), HealthError> {
        let now = self.clock.now();
        self.store.update_process(
            pid,
            ProcessUpdate {
                state: Some(ProcessState::Failed),
                error: Some(Some(error)),
                stopped_at: Some(now),
                ..Default::default()
            },
        )?;
        Ok(())
    }

    fn append_service_line(&self, name: &str, stream: Stream, msg: &str) -> Result<(), HealthError> {
        let path = match stream {
            Stream::Stdout => self.base_dir.join("logs").join(format!("{name}-out.log")),
            Stream::Stderr => self
                .base_dir
                .join("logs")
                .join(format!("{name}-error.log")),
        };
        let sink = ServiceLogSink::open(&path)?;
        sink.write_supervisor_line(msg)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl From<eos_adapters::LoggerError> for HealthError {
    fn from(err: eos_adapters::LoggerError) -> Self {
        match err {
            eos_adapters::LoggerError::Io(io) => HealthError::Io(io),
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
