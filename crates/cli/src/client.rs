// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client: a thin socket wrapper over the IPC protocol (§4.4). One
//! connection per request, matching the daemon's "decode, dispatch, encode,
//! close" contract.

use std::path::PathBuf;

use eos_daemon::protocol::{
    AddCatalogArgs, CreateLogArgs, Envelope, NameArg, Request, ServiceLogArgs, TimedArgs,
    UpdateCatalogArgs,
};
use eos_daemon::wire::{self, ProtocolError, DEFAULT_TIMEOUT};
use eos_daemon::Config;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (no socket at {0})")]
    DaemonNotRunning(PathBuf),

    #[error("could not determine state directory: {0}")]
    Config(#[from] eos_daemon::DaemonError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("{0}")]
    Rejected(String),

    #[error("malformed response data: {0}")]
    BadResponseShape(serde_json::Error),
}

/// A connection to the running `eosd` daemon.
pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect to the daemon named by the resolved state directory.
    /// Fails fast if the socket file is absent rather than attempting to
    /// auto-start a daemon — unlike a long-lived agent supervisor, this
    /// service supervisor's CLI expects the operator to run `eosd` (or a
    /// service manager) separately.
    pub fn connect() -> Result<Self, ClientError> {
        let config = Config::load()?;
        if !config.socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(config.socket_path));
        }
        Ok(Self {
            socket_path: config.socket_path,
        })
    }

    #[cfg(test)]
    fn at(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    async fn roundtrip(&self, request: &Request) -> Result<Envelope, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path).await?;
        let bytes = wire::encode(request)?;
        wire::write_message(&mut stream, &bytes).await?;
        let response_bytes =
            tokio::time::timeout(DEFAULT_TIMEOUT, wire::read_message(&mut stream))
                .await
                .map_err(|_| ProtocolError::Timeout)??;
        Ok(wire::decode(&response_bytes)?)
    }

    /// Send a request and decode a successful `data` payload as `T`.
    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, ClientError> {
        let envelope = self.roundtrip(&request).await?;
        if !envelope.success {
            return Err(ClientError::Rejected(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        let data = envelope.data.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(data).map_err(ClientError::BadResponseShape)
    }

    /// Send a request that returns no payload on success.
    async fn send_empty(&self, request: Request) -> Result<(), ClientError> {
        let envelope = self.roundtrip(&request).await?;
        if envelope.success {
            Ok(())
        } else {
            Err(ClientError::Rejected(
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }

    pub async fn register(
        &self,
        name: &str,
        dir: PathBuf,
        config_file: &str,
    ) -> Result<eos_core::ServiceCatalogEntry, ClientError> {
        let service = eos_core::ServiceCatalogEntry::new(name, dir, config_file, chrono::Utc::now());
        self.send(Request::AddServiceCatalogEntry(AddCatalogArgs { service }))
            .await
    }

    pub async fn update_catalog(
        &self,
        name: &str,
        new_directory_path: String,
        new_config_filename: String,
    ) -> Result<eos_core::ServiceCatalogEntry, ClientError> {
        self.send(Request::UpdateServiceCatalogEntry(UpdateCatalogArgs {
            name: name.to_string(),
            new_directory_path,
            new_config_filename,
        }))
        .await
    }

    pub async fn unregister(&self, name: &str) -> Result<bool, ClientError> {
        self.send(Request::RemoveServiceCatalogEntry(NameArg {
            name: name.to_string(),
        }))
        .await
    }

    pub async fn remove_instance(&self, name: &str) -> Result<bool, ClientError> {
        #[derive(serde::Deserialize)]
        struct Removed {
            removed: bool,
        }
        let removed: Removed = self
            .send(Request::RemoveServiceInstance(NameArg {
                name: name.to_string(),
            }))
            .await?;
        Ok(removed.removed)
    }

    pub async fn is_registered(&self, name: &str) -> Result<bool, ClientError> {
        self.send(Request::IsServiceRegistered(NameArg {
            name: name.to_string(),
        }))
        .await
    }

    pub async fn get_catalog_entry(
        &self,
        name: &str,
    ) -> Result<eos_core::ServiceCatalogEntry, ClientError> {
        self.send(Request::GetServiceCatalogEntry(NameArg {
            name: name.to_string(),
        }))
        .await
    }

    pub async fn list_catalog(&self) -> Result<Vec<eos_core::ServiceCatalogEntry>, ClientError> {
        self.send(Request::GetAllServiceCatalogEntries).await
    }

    pub async fn get_service_instance(
        &self,
        name: &str,
    ) -> Result<eos_daemon::protocol::ServiceInstance, ClientError> {
        self.send(Request::GetServiceInstance(NameArg {
            name: name.to_string(),
        }))
        .await
    }

    pub async fn most_recent_process(
        &self,
        name: &str,
    ) -> Result<Option<eos_core::ProcessHistoryEntry>, ClientError> {
        self.send(Request::GetMostRecentProcessHistoryEntry(NameArg {
            name: name.to_string(),
        }))
        .await
    }

    pub async fn start(&self, name: &str) -> Result<u32, ClientError> {
        #[derive(serde::Deserialize)]
        struct Started {
            pid: u32,
        }
        let started: Started = self
            .send(Request::StartService(NameArg {
                name: name.to_string(),
            }))
            .await?;
        Ok(started.pid)
    }

    pub async fn restart(
        &self,
        name: &str,
        grace_period: &str,
        ticker_period: &str,
    ) -> Result<u32, ClientError> {
        #[derive(serde::Deserialize)]
        struct Started {
            pid: u32,
        }
        let started: Started = self
            .send(Request::RestartService(TimedArgs {
                name: name.to_string(),
                grace_period: grace_period.to_string(),
                ticker_period: ticker_period.to_string(),
            }))
            .await?;
        Ok(started.pid)
    }

    pub async fn stop(
        &self,
        name: &str,
        grace_period: &str,
        ticker_period: &str,
    ) -> Result<eos_lifecycle::StopOutcome, ClientError> {
        self.send(Request::StopService(TimedArgs {
            name: name.to_string(),
            grace_period: grace_period.to_string(),
            ticker_period: ticker_period.to_string(),
        }))
        .await
    }

    pub async fn force_stop(&self, name: &str) -> Result<eos_lifecycle::StopOutcome, ClientError> {
        self.send(Request::ForceStopService(NameArg {
            name: name.to_string(),
        }))
        .await
    }

    pub async fn create_service_logs(&self, name: &str) -> Result<(), ClientError> {
        self.send_empty(Request::CreateServiceLogFiles(CreateLogArgs {
            service_name: name.to_string(),
        }))
        .await
    }

    pub async fn log_file_path(&self, name: &str, error_log: bool) -> Result<PathBuf, ClientError> {
        let path: String = self
            .send(Request::GetServiceLogFilePath(ServiceLogArgs {
                service_name: name.to_string(),
                error_log,
            }))
            .await?;
        Ok(PathBuf::from(path))
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
