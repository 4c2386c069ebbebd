// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-service configuration file: a pure-function YAML loader.
//!
//! `ServiceConfig` is re-read from disk on every start/restart and never
//! cached across operations.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// The `runtime:` block of a service config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub path: Option<String>,
}

impl RuntimeConfig {
    /// `runtime.type` is one of the node aliases that get extra validation
    /// (a present, executable `node` binary). Other runtime types are
    /// accepted but otherwise unchecked.
    pub fn is_node(&self) -> bool {
        matches!(self.type_.as_str(), "node" | "nodejs")
    }
}

/// Read-only, load-on-demand service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub env_file: Option<String>,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Errors loading or validating a service config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ServiceConfig {
    /// Parse a config from an already-open reader. Pure function: no I/O
    /// beyond consuming `reader`, no caching.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let config: ServiceConfig = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file from disk.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Require non-empty `name`, `command`, and `runtime.type`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".into()));
        }
        if self.command.trim().is_empty() {
            return Err(ConfigError::Invalid("command must not be empty".into()));
        }
        if self.runtime.type_.trim().is_empty() {
            return Err(ConfigError::Invalid("runtime.type must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
