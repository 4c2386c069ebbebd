// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance enforcement via a PID file: a live PID in the file
//! refuses a second daemon startup; a stale one (dead PID) is removed and
//! replaced. An `flock` exclusive lock on the same file closes the race
//! window between the liveness check and the write.

use std::fs;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::signal::is_alive;

#[derive(Debug, Error)]
pub enum PidLockError {
    #[error("another instance is already running with pid {0}")]
    AlreadyRunning(u32),
    #[error("pid file contents are not a valid pid: {0:?}")]
    Corrupt(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A held PID-file lock: the file handle underneath it holds an `flock`
/// exclusive lock for as long as this value lives. Dropping it releases the
/// OS lock but does not remove the file — removal is an explicit step taken
/// during orderly shutdown so a crash leaves the PID file in place for the
/// next startup's liveness check.
pub struct PidLock {
    path: PathBuf,
    file: fs::File,
}

impl PidLock {
    /// Acquire the lock at `path`, writing the current process's PID. Fails
    /// if the existing file names a live process; removes a stale file.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, PidLockError> {
        let path = path.into();
        if let Some(existing) = read_pid(&path)? {
            if is_alive(existing) {
                return Err(PidLockError::AlreadyRunning(existing));
            }
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)?;
        if file.try_lock_exclusive().is_err() {
            // Another process won the race between our liveness check and
            // this lock attempt; its PID is whatever is now on disk.
            let holder = read_pid(&path)?.unwrap_or(0);
            return Err(PidLockError::AlreadyRunning(holder));
        }

        write_pid(&mut file, std::process::id())?;
        set_mode(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the `flock` and remove the PID file. Called during orderly
    /// shutdown.
    pub fn release(self) -> Result<(), PidLockError> {
        fs2::FileExt::unlock(&self.file)?;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn read_pid(path: &Path) -> Result<Option<u32>, PidLockError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            trimmed
                .parse::<u32>()
                .map(Some)
                .map_err(|_| PidLockError::Corrupt(trimmed.to_string()))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn write_pid(file: &mut fs::File, pid: u32) -> Result<(), PidLockError> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(pid.to_string().as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path) -> Result<(), PidLockError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path) -> Result<(), PidLockError> {
    Ok(())
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
