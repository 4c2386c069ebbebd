// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability the health monitor depends on to trigger a restart,
//! without depending on `LifecycleEngine`'s concrete type — this is what
//! keeps "monitor calls engine, engine's writes are observed by the next
//! monitor tick" from becoming a literal type-level cycle.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::LifecycleError;

#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn restart(
        &self,
        name: &str,
        grace_period: Duration,
        tick_period: Duration,
    ) -> Result<u32, LifecycleError>;
}
