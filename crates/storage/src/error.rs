// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors a `Store` implementation can return.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("service already registered: {0}")]
    AlreadyRegistered(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("empty partial update rejected")]
    EmptyUpdate,
}
