// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service catalog entries: the registration record for a service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// A registered service: a name, the directory it lives in, and the name of
/// its config file within that directory.
///
/// Created by `register`, updated by `update`, destroyed by `unregister`.
/// Never implicitly created by any other operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalogEntry {
    pub name: String,
    pub directory_path: PathBuf,
    pub config_file_name: String,
    pub created_at: DateTime<Utc>,
}

impl ServiceCatalogEntry {
    pub fn new(
        name: impl Into<String>,
        directory_path: PathBuf,
        config_file_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            directory_path,
            config_file_name: config_file_name.into(),
            created_at,
        }
    }

    /// Absolute path to the config file named by this entry.
    pub fn config_path(&self) -> PathBuf {
        self.directory_path.join(&self.config_file_name)
    }
}
