// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-history entries: the lifecycle record of one spawned child,
//! keyed by its OS PID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five states a supervised process can be classified into.
///
/// PIDs are reused by the OS, so a `ProcessHistoryEntry` must be treated as a
/// record about a *specific spawn*, not a forever-key for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    Unknown,
    Starting,
    Running,
    Stopped,
    Failed,
}

impl ProcessState {
    /// Terminal states are never re-dispatched by the health monitor.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessState::Stopped | ProcessState::Failed)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessState::Unknown => "unknown",
            ProcessState::Starting => "starting",
            ProcessState::Running => "running",
            ProcessState::Stopped => "stopped",
            ProcessState::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Lifecycle record for one spawned child process, keyed by PID.
///
/// Created on each spawn with state `Unknown`, transitioned to `Starting`
/// immediately; `Stopped`/`Failed` are terminal and never deleted by normal
/// flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessHistoryEntry {
    pub pid: u32,
    pub service_name: String,
    pub state: ProcessState,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProcessHistoryEntry {
    pub fn new(pid: u32, service_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            pid,
            service_name: service_name.into(),
            state: ProcessState::Unknown,
            error: None,
            created_at: now,
            started_at: None,
            stopped_at: None,
            updated_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

/// Partial update to a `ProcessHistoryEntry`. Every field is optional; an
/// update with every field `None` is rejected by the store.
///
/// `error` is doubly-optional: `None` leaves the field untouched, `Some(None)`
/// clears it, `Some(Some(msg))` sets it.
#[derive(Debug, Clone, Default)]
pub struct ProcessUpdate {
    pub state: Option<ProcessState>,
    pub error: Option<Option<String>>,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl ProcessUpdate {
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.error.is_none()
            && self.started_at.is_none()
            && self.stopped_at.is_none()
    }
}

/// Select the "most recent" entry from a service's process history: highest
/// `started_at`, falling back to insertion (list) order, ties broken by
/// highest PID.
pub fn most_recent_process(entries: &[ProcessHistoryEntry]) -> Option<&ProcessHistoryEntry> {
    entries.iter().enumerate().max_by(|(ia, a), (ib, b)| {
        a.started_at
            .cmp(&b.started_at)
            .then_with(|| ia.cmp(ib))
            .then_with(|| a.pid.cmp(&b.pid))
    }).map(|(_, entry)| entry)
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
