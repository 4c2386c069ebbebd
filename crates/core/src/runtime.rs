// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-service runtime record: accumulated counters that survive restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accumulated, per-service state that survives across restarts.
///
/// Created on first successful `start`; `restart_count` is incremented by
/// every `Restart` call, whether driven by the health monitor's backoff
/// logic or by an explicit client request — there is no separate "restart
/// without counting" path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRuntime {
    pub name: String,
    pub restart_count: u32,
    pub last_health_check: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ServiceRuntime {
    pub fn new(name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            restart_count: 0,
            last_health_check: None,
            created_at: now,
            started_at: None,
            updated_at: None,
        }
    }
}

/// Partial update to a `ServiceRuntime`. An update with every field `None`
/// is rejected by the store.
#[derive(Debug, Clone, Default)]
pub struct RuntimeUpdate {
    pub restart_count: Option<u32>,
    pub last_health_check: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
}

impl RuntimeUpdate {
    pub fn is_empty(&self) -> bool {
        self.restart_count.is_none() && self.last_health_check.is_none() && self.started_at.is_none()
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
