// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `IpcServer`: accepts local stream-socket connections, decodes one
//! request per connection, dispatches to the Store / LifecycleEngine, and
//! encodes one response before closing (§4.4). Many connections run
//! concurrently; each is handled on its own task.

use std::path::PathBuf;
use std::sync::Arc;

use eos_core::{most_recent_process, SystemClock};
use eos_lifecycle::LifecycleEngine;
use eos_store::Store;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::protocol::{
    AddCatalogArgs, CreateLogArgs, Envelope, NameArg, Request, ServiceInstance, ServiceLogArgs,
    TimedArgs, UpdateCatalogArgs,
};
use crate::wire::{self, ProtocolError, DEFAULT_TIMEOUT};

/// Everything a connection handler needs to dispatch a request: the Store,
/// the lifecycle engine, and the base directory service log files live
/// under.
pub struct IpcServer {
    store: Arc<dyn Store>,
    engine: Arc<LifecycleEngine<SystemClock>>,
    base_dir: PathBuf,
}

impl IpcServer {
    pub fn new(
        store: Arc<dyn Store>,
        engine: Arc<LifecycleEngine<SystemClock>>,
        base_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            engine,
            base_dir,
        }
    }

    /// Accept connections until `stop` is notified. The listener itself is
    /// closed by the caller dropping it (§4.5 step 7); `stop` lets this
    /// loop return promptly without relying on that alone.
    pub async fn run(self: Arc<Self>, listener: UnixListener, stop: Arc<Notify>) {
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let server = Arc::clone(&self);
                            tokio::spawn(async move { server.handle_connection(stream).await; });
                        }
                        Err(err) => warn!(error = %err, "accept failed"),
                    }
                }
                _ = stop.notified() => return,
            }
        }
    }

    async fn handle_connection(&self, mut stream: UnixStream) {
        let raw: serde_json::Value = match wire::read_json(&mut stream, DEFAULT_TIMEOUT).await {
            Ok(value) => value,
            Err(ProtocolError::ConnectionClosed) => return,
            Err(err) => {
                let envelope = Envelope::err(format!("protocol error: {err}"));
                let _ = wire::write_json(&mut stream, &envelope, DEFAULT_TIMEOUT).await;
                return;
            }
        };

        let request: Request = match serde_json::from_value(raw.clone()) {
            Ok(req) => req,
            Err(decode_err) => {
                let method_name = raw.get("method").and_then(|m| m.as_str());
                let envelope = match method_name {
                    Some(name) if !Request::is_known_method(name) => {
                        Envelope::err(format!("unknown method: {name}"))
                    }
                    Some(name) => Envelope::err(format!("invalid args for method {name}: {decode_err}")),
                    None => Envelope::err(format!("protocol error: {decode_err}")),
                };
                let _ = wire::write_json(&mut stream, &envelope, DEFAULT_TIMEOUT).await;
                return;
            }
        };

        let method = request.method_name();
        debug!(method, "dispatching request");
        let envelope = self.dispatch(request).await;
        if let Err(err) = wire::write_json(&mut stream, &envelope, DEFAULT_TIMEOUT).await {
            warn!(method, error = %err, "failed to write response");
        }
    }

    async fn dispatch(&self, request: Request) -> Envelope {
        match request {
            Request::GetServiceInstance(NameArg { name }) => self.get_service_instance(&name),
            Request::RemoveServiceInstance(NameArg { name }) => self.remove_service_instance(&name),
            Request::StartService(NameArg { name }) => self.start_service(&name).await,
            Request::RestartService(args) => self.restart_service(args).await,
            Request::StopService(args) => self.stop_service(args).await,
            Request::ForceStopService(NameArg { name }) => self.force_stop_service(&name).await,
            Request::AddServiceCatalogEntry(args) => self.add_catalog_entry(args),
            Request::GetAllServiceCatalogEntries => {
                Envelope::ok(serde_json::json!(self.store.list_catalog()))
            }
            Request::GetServiceCatalogEntry(NameArg { name }) => self.get_catalog_entry(&name),
            Request::IsServiceRegistered(NameArg { name }) => {
                Envelope::ok(serde_json::json!(self.store.is_registered(&name)))
            }
            Request::RemoveServiceCatalogEntry(NameArg { name }) => {
                Envelope::ok(serde_json::json!(self.store.remove_catalog(&name)))
            }
            Request::UpdateServiceCatalogEntry(args) => self.update_catalog_entry(args),
            Request::GetMostRecentProcessHistoryEntry(NameArg { name }) => {
                self.get_most_recent_process(&name)
            }
            Request::CreateServiceLogFiles(args) => self.create_service_logs(args),
            Request::GetServiceLogFilePath(args) => self.service_log_path(args),
        }
    }

    fn get_service_instance(&self, name: &str) -> Envelope {
        let catalog = match self.store.get_catalog(name) {
            Ok(catalog) => catalog,
            Err(err) => return Envelope::err(err.to_string()),
        };
        let runtime = self.store.get_runtime(name).ok();
        let process = if runtime.is_some() {
            let history = self.store.list_processes_by_name(name);
            most_recent_process(&history).cloned()
        } else {
            None
        };
        Envelope::ok(serde_json::json!(ServiceInstance {
            catalog,
            runtime,
            process,
        }))
    }

    /// Destroy the `ServiceRuntime` and all process-history entries for
    /// `name`; the catalog entry is untouched (that's
    /// `RemoveServiceCatalogEntry`'s job).
    fn remove_service_instance(&self, name: &str) -> Envelope {
        let removed = self.store.remove_runtime(name);
        for entry in self.store.list_processes_by_name(name) {
            self.store.remove_process(entry.pid);
        }
        Envelope::ok(serde_json::json!({ "removed": removed }))
    }

    async fn start_service(&self, name: &str) -> Envelope {
        match self.engine.start(name).await {
            Ok(pid) => Envelope::ok(serde_json::json!({ "pid": pid })),
            Err(err) => Envelope::err(err.to_string()),
        }
    }

    async fn restart_service(&self, args: TimedArgs) -> Envelope {
        let grace_period = match crate::protocol::parse_duration(&args.grace_period) {
            Ok(d) => d,
            Err(msg) => return Envelope::err(msg),
        };
        let tick_period = match crate::protocol::parse_duration(&args.ticker_period) {
            Ok(d) => d,
            Err(msg) => return Envelope::err(msg),
        };
        match self.engine.restart(&args.name, grace_period, tick_period).await {
            Ok(pid) => Envelope::ok(serde_json::json!({ "pid": pid })),
            Err(err) => Envelope::err(err.to_string()),
        }
    }

    async fn stop_service(&self, args: TimedArgs) -> Envelope {
        let grace_period = match crate::protocol::parse_duration(&args.grace_period) {
            Ok(d) => d,
            Err(msg) => return Envelope::err(msg),
        };
        let tick_period = match crate::protocol::parse_duration(&args.ticker_period) {
            Ok(d) => d,
            Err(msg) => return Envelope::err(msg),
        };
        match self
            .engine
            .stop_graceful(&args.name, grace_period, tick_period)
            .await
        {
            Ok(outcome) => Envelope::ok(serde_json::json!(outcome)),
            Err(err) => Envelope::err(err.to_string()),
        }
    }

    async fn force_stop_service(&self, name: &str) -> Envelope {
        match self.engine.force_stop(name).await {
            Ok(outcome) => Envelope::ok(serde_json::json!(outcome)),
            Err(err) => Envelope::err(err.to_string()),
        }
    }

    fn add_catalog_entry(&self, args: AddCatalogArgs) -> Envelope {
        let service = args.service;
        match self.store.register_service(
            &service.name,
            service.directory_path.clone(),
            &service.config_file_name,
        ) {
            Ok(()) => self.get_catalog_entry(&service.name),
            Err(err) => Envelope::err(err.to_string()),
        }
    }

    fn get_catalog_entry(&self, name: &str) -> Envelope {
        match self.store.get_catalog(name) {
            Ok(entry) => Envelope::ok(serde_json::json!(entry)),
            Err(err) => Envelope::err(err.to_string()),
        }
    }

    fn update_catalog_entry(&self, args: UpdateCatalogArgs) -> Envelope {
        match self.store.update_catalog(
            &args.name,
            PathBuf::from(args.new_directory_path),
            &args.new_config_filename,
        ) {
            Ok(()) => self.get_catalog_entry(&args.name),
            Err(err) => Envelope::err(err.to_string()),
        }
    }

    fn get_most_recent_process(&self, name: &str) -> Envelope {
        let history = self.store.list_processes_by_name(name);
        match most_recent_process(&history) {
            Some(entry) => Envelope::ok(serde_json::json!(entry)),
            None => Envelope::ok(serde_json::Value::Null),
        }
    }

    fn create_service_logs(&self, args: CreateLogArgs) -> Envelope {
        if let Err(err) = eos_adapters::open_service_log(&self.out_log_path(&args.service_name)) {
            return Envelope::err(err.to_string());
        }
        if let Err(err) = eos_adapters::open_service_log(&self.error_log_path(&args.service_name)) {
            return Envelope::err(err.to_string());
        }
        Envelope::ok_empty()
    }

    fn service_log_path(&self, args: ServiceLogArgs) -> Envelope {
        let path = if args.error_log {
            self.error_log_path(&args.service_name)
        } else {
            self.out_log_path(&args.service_name)
        };
        Envelope::ok(serde_json::json!(path.display().to_string()))
    }

    fn out_log_path(&self, name: &str) -> PathBuf {
        self.base_dir.join("logs").join(format!("{name}-out.log"))
    }

    fn error_log_path(&self, name: &str) -> PathBuf {
        self.base_dir
            .join("logs")
            .join(format!("{name}-error.log"))
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
