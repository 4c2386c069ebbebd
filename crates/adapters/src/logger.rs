// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's own size-rotated log, and per-service stdout/stderr append
//! sinks that the health monitor writes annotated lines into.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Append-only daemon log, rotated by renaming when the next write would
/// push the current file past `max_size` bytes.
pub struct DaemonLogger {
    path: PathBuf,
    max_size: u64,
    inner: Mutex<File>,
}

impl DaemonLogger {
    pub fn open(path: impl Into<PathBuf>, max_size: u64) -> Result<Self, LoggerError> {
        let path = path.into();
        rotate_log_if_needed(&path, 0, max_size)?;
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            max_size,
            inner: Mutex::new(file),
        })
    }

    pub fn log(&self, level: LogLevel, message: &str) -> Result<(), LoggerError> {
        self.write_line(&format_line(Utc::now(), level, message))
    }

    fn write_line(&self, line: &str) -> Result<(), LoggerError> {
        let mut file = self.inner.lock();
        if rotate_log_if_needed(&self.path, line.len() as u64, self.max_size)? {
            *file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        }
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

fn format_line(at: DateTime<Utc>, level: LogLevel, message: &str) -> String {
    format!("[{}] {}: {}\n", at.format("%Y-%m-%dT%H:%M:%3fZ"), level, message)
}

/// Shift `path` -> `path.1` -> `path.2` -> ... if writing `incoming_len`
/// more bytes would push the current file over `max_size`. Returns whether
/// a rotation happened, so the caller can reopen its handle.
fn rotate_log_if_needed(path: &Path, incoming_len: u64, max_size: u64) -> Result<bool, LoggerError> {
    let current_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if current_size == 0 || current_size + incoming_len <= max_size {
        return Ok(false);
    }

    let mut index = 1;
    while sibling_with_suffix(path, index).exists() {
        index += 1;
    }
    while index > 1 {
        let from = sibling_with_suffix(path, index - 1);
        let to = sibling_with_suffix(path, index);
        if from.exists() {
            std::fs::rename(&from, &to)?;
        }
        index -= 1;
    }
    std::fs::rename(path, sibling_with_suffix(path, 1))?;
    Ok(true)
}

fn sibling_with_suffix(path: &Path, index: u32) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push_str(&format!(".{index}"));
    path.with_file_name(name)
}

/// A per-service append-only sink (stdout or stderr), used by the health
/// monitor to annotate supervisor-authored observations into the same file
/// the child's own output is written to.
pub struct ServiceLogSink {
    file: Mutex<File>,
}

impl ServiceLogSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoggerError> {
        let file = open_service_log(path.as_ref())?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Write a supervisor-authored line: `[YYYY-MM-DD HH:MM:SS] [HEALTH MONITOR] <msg>`.
    pub fn write_supervisor_line(&self, message: &str) -> Result<(), LoggerError> {
        let line = format!(
            "[{}] [HEALTH MONITOR] {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            message
        );
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Open (creating if absent) a per-service log file at mode 0644, and its
/// parent directory at mode 0750 if it doesn't already exist.
pub fn open_service_log(path: &Path) -> Result<File, LoggerError> {
    if let Some(parent) = path.parent() {
        create_logs_dir(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    set_mode(path, 0o644)?;
    Ok(file)
}

fn create_logs_dir(dir: &Path) -> Result<(), LoggerError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        set_mode(dir, 0o750)?;
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), LoggerError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), LoggerError> {
    Ok(())
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
