// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signal delivery and liveness probing for supervised PIDs.

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("permission denied sending signal to pid {0}")]
    PermissionDenied(u32),
    #[error("failed to signal pid {pid}: {source}")]
    Other { pid: u32, source: Errno },
}

/// What happened when a signal was sent to a (possibly already-dead) PID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The signal was delivered.
    Delivered,
    /// The process no longer exists (ESRCH); treat as already-terminated.
    NoSuchProcess,
}

/// Send `signal` to `pid`. ESRCH is not an error: it means the process is
/// already gone, which callers treat as a terminated PID rather than a
/// failure to signal.
pub fn send_signal(pid: u32, sig: Signal) -> Result<SignalOutcome, SignalError> {
    match signal::kill(Pid::from_raw(pid as i32), sig) {
        Ok(()) => Ok(SignalOutcome::Delivered),
        Err(Errno::ESRCH) => Ok(SignalOutcome::NoSuchProcess),
        Err(Errno::EPERM) => Err(SignalError::PermissionDenied(pid)),
        Err(source) => Err(SignalError::Other { pid, source }),
    }
}

/// Signal-0 liveness check: true if the PID exists and is signalable.
pub fn is_alive(pid: u32) -> bool {
    matches!(
        signal::kill(Pid::from_raw(pid as i32), None),
        Ok(()) | Err(Errno::EPERM)
    )
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
