// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Core data model for the service supervisor: catalog entries, runtime
//! records, process-history entries, and the per-service config format.

mod catalog;
mod clock;
mod config;
mod process;
mod runtime;

pub use catalog::ServiceCatalogEntry;
pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, RuntimeConfig, ServiceConfig};
pub use process::{most_recent_process, ProcessHistoryEntry, ProcessState, ProcessUpdate};
pub use runtime::{RuntimeUpdate, ServiceRuntime};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
