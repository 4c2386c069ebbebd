// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backoff law for the `check_failed` handler: the minimum wait between
//! successive restart attempts, doubling with each prior restart up to a
//! cap.

use std::time::Duration;

const BASE_MS: u64 = 300;
const CAP_MS: u64 = 60_000;

/// `required_delay(n) = min(300 * 2^n, 60_000)` milliseconds.
pub fn required_delay(restart_count: u32) -> Duration {
    let doubled = BASE_MS.saturating_mul(1u64.checked_shl(restart_count).unwrap_or(u64::MAX));
    Duration::from_millis(doubled.min(CAP_MS))
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
