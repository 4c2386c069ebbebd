// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Transactional, concurrency-safe storage for catalog entries, runtime
//! records, and process-history entries.
//!
//! `Store` is the injected data-access interface every higher layer
//! depends on. [`MemoryStore`] is the reference
//! implementation — a `parking_lot`-guarded in-memory table safe for
//! concurrent readers and writers, with last-writer-wins semantics per field
//! on a partial update.

mod error;
mod memory;
mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use traits::Store;
