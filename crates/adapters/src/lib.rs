// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! I/O adapters: process spawning, signal delivery and liveness probing,
//! the daemon log (size-rotated) and per-service log sinks, and the
//! single-instance PID-file lock.

pub mod env;
pub mod logger;
pub mod pidfile;
pub mod runtime_validation;
pub mod signal;
pub mod spawn;

pub use env::build_environment;
pub use logger::{open_service_log, DaemonLogger, LogLevel, LoggerError, ServiceLogSink};
pub use pidfile::{PidLock, PidLockError};
pub use runtime_validation::{validate_runtime, RuntimeValidationError};
pub use signal::{is_alive, send_signal, SignalError, SignalOutcome};
pub use spawn::{spawn_service, SpawnError};
