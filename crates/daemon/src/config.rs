// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: the fixed set of paths under one state directory
//! (§6 external interfaces).

use std::path::PathBuf;

use crate::supervisor::DaemonError;

/// Maximum size of `daemon.log` before rotation (10 MiB).
pub const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// All daemon-owned paths, rooted at one state directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_dir: PathBuf,
    pub socket_path: PathBuf,
    pub pid_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve the fixed path set for the user-level daemon. One daemon
    /// serves the whole host; there is no per-project config.
    pub fn load() -> Result<Self, DaemonError> {
        let base_dir = state_dir()?;
        Ok(Self {
            socket_path: base_dir.join("eos.sock"),
            pid_path: base_dir.join("eos.pid"),
            log_path: base_dir.join("logs").join("daemon.log"),
            base_dir,
        })
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }
}

/// Resolve the state directory: `EOS_STATE_DIR` > `XDG_STATE_HOME/eos` >
/// `~/.local/state/eos`.
fn state_dir() -> Result<PathBuf, DaemonError> {
    if let Ok(dir) = std::env::var("EOS_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("eos"));
    }
    let home = dirs::home_dir().ok_or(DaemonError::NoStateDir)?;
    Ok(home.join(".local/state/eos"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
