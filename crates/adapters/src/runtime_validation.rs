// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation of a service's `runtime.path`/`runtime.type` against the
//! filesystem and `PATH`, per the config's declared runtime kind.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use eos_core::RuntimeConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeValidationError {
    #[error("runtime path {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("runtime path {0} has no node executable")]
    MissingNodeBinary(PathBuf),
    #[error("no `node` executable found on PATH")]
    NodeNotOnPath,
    #[error("could not resolve home directory for relative runtime path")]
    NoHomeDirectory,
    #[error("io error validating runtime: {0}")]
    Io(#[from] std::io::Error),
}

/// Resolve and validate `config.runtime` relative to `home_dir`. Returns
/// the absolute runtime path when one was declared.
pub fn validate_runtime(
    config: &RuntimeConfig,
    home_dir: Option<&Path>,
    path_env: Option<&str>,
) -> Result<Option<PathBuf>, RuntimeValidationError> {
    let declared_path = config.path.as_deref().unwrap_or("").trim();
    if declared_path.is_empty() {
        if config.is_node() && which(path_env, "node").is_none() {
            return Err(RuntimeValidationError::NodeNotOnPath);
        }
        return Ok(None);
    }

    let raw = PathBuf::from(declared_path);
    let absolute = if raw.is_absolute() {
        raw
    } else {
        let home = home_dir.ok_or(RuntimeValidationError::NoHomeDirectory)?;
        home.join(raw)
    };

    if !absolute.is_dir() {
        return Err(RuntimeValidationError::NotADirectory(absolute));
    }

    if config.is_node() {
        let node_bin = absolute.join("node");
        let executable = node_bin
            .metadata()
            .map(|meta| meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false);
        if !executable {
            return Err(RuntimeValidationError::MissingNodeBinary(absolute));
        }
    }

    Ok(Some(absolute))
}

fn which(path_env: Option<&str>, bin: &str) -> Option<PathBuf> {
    let path_env = path_env?;
    std::env::split_paths(path_env)
        .map(|dir| dir.join(bin))
        .find(|candidate| {
            candidate
                .metadata()
                .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
                .unwrap_or(false)
        })
}

#[cfg(test)]
#[path = "runtime_validation_tests.rs"]
mod tests;
