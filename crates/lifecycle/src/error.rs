// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the lifecycle engine.

use eos_core::ConfigError;
use eos_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("service {0} is not registered")]
    NotFound(String),

    #[error("invalid config for {name}: {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("service {0} is already registered")]
    AlreadyRegistered(String),

    #[error("service {name} is already starting (pid {pid})")]
    AlreadyStarting { name: String, pid: u32 },

    #[error("service {name} is already running (pid {pid})")]
    AlreadyRunning { name: String, pid: u32 },

    #[error("service {0} is not running")]
    NotRunning(String),

    #[error("failed to spawn service {name}: {reason}")]
    SpawnFailed { name: String, reason: String },

    #[error("runtime configuration invalid for {name}: {reason}")]
    RuntimeInvalid { name: String, reason: String },

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("store error: {0}")]
    StoreError(#[from] StoreError),

    /// A state-changing operation partially succeeded and the rollback
    /// itself failed or was only partial; both outcomes are surfaced so an
    /// operator can intervene manually.
    #[error("{original} (rollback outcome: {rollback})")]
    Compound {
        original: Box<LifecycleError>,
        rollback: String,
    },
}

impl From<ConfigError> for LifecycleError {
    fn from(err: ConfigError) -> Self {
        LifecycleError::InvalidConfig {
            name: String::new(),
            reason: err.to_string(),
        }
    }
}

impl LifecycleError {
    pub fn invalid_config(name: impl Into<String>, reason: impl Into<String>) -> Self {
        LifecycleError::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn compound(original: LifecycleError, rollback: impl Into<String>) -> Self {
        LifecycleError::Compound {
            original: Box::new(original),
            rollback: rollback.into(),
        }
    }
}
