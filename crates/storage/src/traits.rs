// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Store` interface — transactional per-operation, concurrency-safe
//! for concurrent readers and writers.
//!
//! All timestamps are UTC; `updated_at` is set automatically on any update
//! by the implementation, not by the caller.

use std::path::PathBuf;

use eos_core::{ProcessHistoryEntry, ProcessUpdate, RuntimeUpdate, ServiceCatalogEntry, ServiceRuntime};

use crate::error::StoreError;

pub trait Store: Send + Sync {
    // --- catalog ---

    /// Returns `Err(AlreadyRegistered)` if `name` is already present.
    fn register_service(
        &self,
        name: &str,
        dir: PathBuf,
        config_file: &str,
    ) -> Result<(), StoreError>;

    /// Returns `Err(NotFound)` if `name` is not registered.
    fn update_catalog(&self, name: &str, dir: PathBuf, config_file: &str) -> Result<(), StoreError>;

    fn remove_catalog(&self, name: &str) -> bool;

    fn is_registered(&self, name: &str) -> bool;

    fn get_catalog(&self, name: &str) -> Result<ServiceCatalogEntry, StoreError>;

    /// Sorted by name ascending.
    fn list_catalog(&self) -> Vec<ServiceCatalogEntry>;

    // --- runtime ---

    /// Idempotent upsert: creates the runtime record if absent, otherwise a no-op.
    fn register_runtime(&self, name: &str) -> Result<(), StoreError>;

    /// Rejects an empty partial update with `Err(EmptyUpdate)`.
    fn update_runtime(&self, name: &str, partial: RuntimeUpdate) -> Result<(), StoreError>;

    fn get_runtime(&self, name: &str) -> Result<ServiceRuntime, StoreError>;

    fn remove_runtime(&self, name: &str) -> bool;

    // --- process history ---

    fn register_process(
        &self,
        pid: u32,
        name: &str,
        initial_state: eos_core::ProcessState,
    ) -> ProcessHistoryEntry;

    /// Rejects an empty partial update with `Err(EmptyUpdate)`.
    fn update_process(&self, pid: u32, partial: ProcessUpdate) -> Result<(), StoreError>;

    fn get_process_by_pid(&self, pid: u32) -> Result<ProcessHistoryEntry, StoreError>;

    /// Any order; callers select "most recent" themselves.
    fn list_processes_by_name(&self, name: &str) -> Vec<ProcessHistoryEntry>;

    fn remove_process(&self, pid: u32) -> bool;
}
