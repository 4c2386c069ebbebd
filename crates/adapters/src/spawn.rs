// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child process spawning. A spawned child's handle is held only long
//! enough to read its PID; the daemon's own reap loop owns the lifetime of
//! the OS process from then on, so we drop the `Child` immediately rather
//! than wait on it here.

use std::fs::File;
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to spawn command: {0}")]
    Io(#[from] std::io::Error),
}

/// Spawn `command` via a login shell with the given working directory,
/// environment, and stdout/stderr sinks. Returns the child's OS PID.
pub fn spawn_service(
    command: &str,
    working_dir: &Path,
    env: &[(String, String)],
    stdout: File,
    stderr: File,
) -> Result<u32, SpawnError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .current_dir(working_dir)
        .env_clear()
        .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));

    let child = cmd.spawn()?;
    Ok(child.id())
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
