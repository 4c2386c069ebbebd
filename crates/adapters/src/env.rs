// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment construction for spawned children: inherit the daemon's
//! environment, optionally prepend a runtime path to `PATH`, optionally set
//! `PORT`.

use std::path::Path;

/// Build the environment a spawned child should see.
///
/// `inherited` is the daemon's own environment (`std::env::vars()` at the
/// call site, injected here for testability). If `runtime_path` is set, it
/// is prepended to `PATH`. If `port` is non-zero, `PORT` is set.
pub fn build_environment(
    inherited: Vec<(String, String)>,
    runtime_path: Option<&Path>,
    port: u16,
) -> Vec<(String, String)> {
    let mut env = inherited;

    if let Some(path) = runtime_path {
        let existing_path = env
            .iter()
            .find(|(k, _)| k == "PATH")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let new_path = if existing_path.is_empty() {
            path.display().to_string()
        } else {
            format!("{}:{}", path.display(), existing_path)
        };
        set_var(&mut env, "PATH", new_path);
    }

    if port != 0 {
        set_var(&mut env, "PORT", port.to_string());
    }

    env
}

fn set_var(env: &mut Vec<(String, String)>, key: &str, value: String) {
    if let Some(entry) = env.iter_mut().find(|(k, _)| k == key) {
        entry.1 = value;
    } else {
        env.push((key.to_string(), value));
    }
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
