// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response shapes for the fifteen recognized IPC methods (§4.4).
//!
//! `Request` is adjacently tagged on `method`/`args` to match the wire
//! shape literally: `{"method": <string>, "args": <JSON raw>}`. `Response`
//! is a flat envelope, not a variant-per-message enum, because the wire
//! response shape is itself flat: `{"success": bool, "data": ..., "error": ...}`.

use std::time::Duration;

use eos_core::{ProcessHistoryEntry, ServiceCatalogEntry, ServiceRuntime};
use serde::{Deserialize, Serialize};

/// One request read off the socket.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "method", content = "args")]
pub enum Request {
    GetServiceInstance(NameArg),
    RemoveServiceInstance(NameArg),
    StartService(NameArg),
    RestartService(TimedArgs),
    StopService(TimedArgs),
    ForceStopService(NameArg),
    AddServiceCatalogEntry(AddCatalogArgs),
    GetAllServiceCatalogEntries,
    GetServiceCatalogEntry(NameArg),
    IsServiceRegistered(NameArg),
    RemoveServiceCatalogEntry(NameArg),
    UpdateServiceCatalogEntry(UpdateCatalogArgs),
    GetMostRecentProcessHistoryEntry(NameArg),
    CreateServiceLogFiles(CreateLogArgs),
    GetServiceLogFilePath(ServiceLogArgs),
}

impl Request {
    /// The method name, for logging; matches the variant name exactly.
    pub fn method_name(&self) -> &'static str {
        match self {
            Request::GetServiceInstance(_) => "GetServiceInstance",
            Request::RemoveServiceInstance(_) => "RemoveServiceInstance",
            Request::StartService(_) => "StartService",
            Request::RestartService(_) => "RestartService",
            Request::StopService(_) => "StopService",
            Request::ForceStopService(_) => "ForceStopService",
            Request::AddServiceCatalogEntry(_) => "AddServiceCatalogEntry",
            Request::GetAllServiceCatalogEntries => "GetAllServiceCatalogEntries",
            Request::GetServiceCatalogEntry(_) => "GetServiceCatalogEntry",
            Request::IsServiceRegistered(_) => "IsServiceRegistered",
            Request::RemoveServiceCatalogEntry(_) => "RemoveServiceCatalogEntry",
            Request::UpdateServiceCatalogEntry(_) => "UpdateServiceCatalogEntry",
            Request::GetMostRecentProcessHistoryEntry(_) => "GetMostRecentProcessHistoryEntry",
            Request::CreateServiceLogFiles(_) => "CreateServiceLogFiles",
            Request::GetServiceLogFilePath(_) => "GetServiceLogFilePath",
        }
    }

    /// The fixed set of recognized method names (§4.4). Used to tell an
    /// unrecognized method apart from a recognized one with malformed args:
    /// the former gets `unknown method: X`, the latter a decode error.
    pub const KNOWN_METHODS: &'static [&'static str] = &[
        "GetServiceInstance",
        "RemoveServiceInstance",
        "StartService",
        "RestartService",
        "StopService",
        "ForceStopService",
        "AddServiceCatalogEntry",
        "GetAllServiceCatalogEntries",
        "GetServiceCatalogEntry",
        "IsServiceRegistered",
        "RemoveServiceCatalogEntry",
        "UpdateServiceCatalogEntry",
        "GetMostRecentProcessHistoryEntry",
        "CreateServiceLogFiles",
        "GetServiceLogFilePath",
    ];

    pub fn is_known_method(name: &str) -> bool {
        Self::KNOWN_METHODS.contains(&name)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NameArg {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimedArgs {
    pub name: String,
    pub grace_period: String,
    pub ticker_period: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddCatalogArgs {
    pub service: ServiceCatalogEntry,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateCatalogArgs {
    pub name: String,
    pub new_directory_path: String,
    pub new_config_filename: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateLogArgs {
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceLogArgs {
    pub service_name: String,
    pub error_log: bool,
}

/// The flat `{success, data, error}` response envelope (§4.4). `data` is
/// omitted on failure; `error` is omitted on success.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// A combined view over a service's catalog, runtime, and most-recent
/// process-history entry; the response payload for `GetServiceInstance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub catalog: ServiceCatalogEntry,
    pub runtime: Option<ServiceRuntime>,
    pub process: Option<ProcessHistoryEntry>,
}

/// Parse a duration in the `<number><unit>` form, `unit` one of `ms`, `s`,
/// `m` (§4.4).
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split_at = raw
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("invalid duration {raw:?}: missing unit"))?;
    let (number, unit) = raw.split_at(split_at);
    let number: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration {raw:?}: not a number"))?;
    match unit {
        "ms" => Ok(Duration::from_millis(number)),
        "s" => Ok(Duration::from_secs(number)),
        "m" => Ok(Duration::from_secs(number * 60)),
        other => Err(format!("invalid duration {raw:?}: unrecognized unit {other:?}")),
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
