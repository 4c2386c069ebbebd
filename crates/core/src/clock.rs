// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so tick-driven tests can control time deterministically.

use chrono::{DateTime, Utc};

/// Source of the current time. Injected into [`crate`] consumers so unit
/// tests can advance a fake clock instead of sleeping.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::Clock;
    use chrono::{DateTime, Duration, Utc};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// A settable clock for tests that exercise timeout and backoff math
    /// against a fixed sequence of ticks.
    #[derive(Clone)]
    pub struct FakeClock(Arc<Mutex<DateTime<Utc>>>);

    impl FakeClock {
        pub fn new(at: DateTime<Utc>) -> Self {
            Self(Arc::new(Mutex::new(at)))
        }

        pub fn set(&self, at: DateTime<Utc>) {
            *self.0.lock() = at;
        }

        pub fn advance(&self, by: Duration) {
            let mut guard = self.0.lock();
            *guard += by;
        }
    }

    impl Default for FakeClock {
        fn default() -> Self {
            Self::new(Utc::now())
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock()
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeClock;

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
