// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Wire protocol, IPC listener, and daemon supervisor: everything that
//! ties `eos-store`, `eos-lifecycle`, and `eos-health` together into the
//! `eosd` binary.

pub mod config;
pub mod listener;
pub mod protocol;
pub mod supervisor;
pub mod wire;

pub use config::Config;
pub use protocol::{Envelope, Request};
pub use supervisor::{DaemonError, DaemonState, StartupResult};
pub use wire::{ProtocolError, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE};
