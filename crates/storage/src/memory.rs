// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Store` implementation.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use eos_core::{
    ProcessHistoryEntry, ProcessState, ProcessUpdate, RuntimeUpdate, ServiceCatalogEntry,
    ServiceRuntime,
};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::traits::Store;

#[derive(Default)]
struct Tables {
    catalog: HashMap<String, ServiceCatalogEntry>,
    runtime: HashMap<String, ServiceRuntime>,
    processes: HashMap<u32, ProcessHistoryEntry>,
}

/// Concurrency-safe in-memory store. Safe for concurrent readers and
/// writers; writes to a single record serialize through the guard, and the
/// last writer's fields win on a partial update.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn register_service(
        &self,
        name: &str,
        dir: PathBuf,
        config_file: &str,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.catalog.contains_key(name) {
            return Err(StoreError::AlreadyRegistered(name.to_string()));
        }
        tables.catalog.insert(
            name.to_string(),
            ServiceCatalogEntry::new(name, dir, config_file, Utc::now()),
        );
        Ok(())
    }

    fn update_catalog(&self, name: &str, dir: PathBuf, config_file: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let entry = tables
            .catalog
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        entry.directory_path = dir;
        entry.config_file_name = config_file.to_string();
        Ok(())
    }

    fn remove_catalog(&self, name: &str) -> bool {
        self.tables.write().catalog.remove(name).is_some()
    }

    fn is_registered(&self, name: &str) -> bool {
        self.tables.read().catalog.contains_key(name)
    }

    fn get_catalog(&self, name: &str) -> Result<ServiceCatalogEntry, StoreError> {
        self.tables
            .read()
            .catalog
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn list_catalog(&self) -> Vec<ServiceCatalogEntry> {
        let mut entries: Vec<_> = self.tables.read().catalog.values().cloned().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn register_runtime(&self, name: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        tables
            .runtime
            .entry(name.to_string())
            .or_insert_with(|| ServiceRuntime::new(name, Utc::now()));
        Ok(())
    }

    fn update_runtime(&self, name: &str, partial: RuntimeUpdate) -> Result<(), StoreError> {
        if partial.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }
        let mut tables = self.tables.write();
        let runtime = tables
            .runtime
            .get_mut(name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        if let Some(count) = partial.restart_count {
            runtime.restart_count = count;
        }
        if let Some(check) = partial.last_health_check {
            runtime.last_health_check = Some(check);
        }
        if let Some(started) = partial.started_at {
            runtime.started_at = Some(started);
        }
        runtime.updated_at = Some(Utc::now());
        Ok(())
    }

    fn get_runtime(&self, name: &str) -> Result<ServiceRuntime, StoreError> {
        self.tables
            .read()
            .runtime
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn remove_runtime(&self, name: &str) -> bool {
        self.tables.write().runtime.remove(name).is_some()
    }

    fn register_process(
        &self,
        pid: u32,
        name: &str,
        initial_state: ProcessState,
    ) -> ProcessHistoryEntry {
        let mut entry = ProcessHistoryEntry::new(pid, name, Utc::now());
        entry.state = initial_state;
        self.tables.write().processes.insert(pid, entry.clone());
        entry
    }

    fn update_process(&self, pid: u32, partial: ProcessUpdate) -> Result<(), StoreError> {
        if partial.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }
        let mut tables = self.tables.write();
        let entry = tables
            .processes
            .get_mut(&pid)
            .ok_or_else(|| StoreError::NotFound(pid.to_string()))?;
        if let Some(state) = partial.state {
            entry.state = state;
        }
        if let Some(error) = partial.error {
            entry.error = error;
        }
        if let Some(started) = partial.started_at {
            entry.started_at = Some(started);
        }
        if let Some(stopped) = partial.stopped_at {
            entry.stopped_at = Some(stopped);
        }
        entry.updated_at = Some(Utc::now());
        Ok(())
    }

    fn get_process_by_pid(&self, pid: u32) -> Result<ProcessHistoryEntry, StoreError> {
        self.tables
            .read()
            .processes
            .get(&pid)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(pid.to_string()))
    }

    fn list_processes_by_name(&self, name: &str) -> Vec<ProcessHistoryEntry> {
        self.tables
            .read()
            .processes
            .values()
            .filter(|p| p.service_name == name)
            .cloned()
            .collect()
    }

    fn remove_process(&self, pid: u32) -> bool {
        self.tables.write().processes.remove(&pid).is_some()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
