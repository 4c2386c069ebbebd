use std::sync::Arc;

use eos_core::SystemClock;
use eos_daemon::listener::IpcServer;
use eos_store::{MemoryStore, Store};
use eos_lifecycle::LifecycleEngine;
use tokio::net::UnixListener;
use tokio::sync::Notify;

use super::*;

/// Spin up a real `IpcServer` bound to a throwaway socket inside `dir`, and
/// hand back a `DaemonClient` pointed at it plus the background task handle.
async fn running_server(
    dir: &std::path::Path,
) -> (DaemonClient, tokio::task::JoinHandle<()>, Arc<Notify>) {
    let socket_path = dir.join("eos.sock");
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let engine = Arc::new(LifecycleEngine::new(
        Arc::clone(&store),
        SystemClock,
        dir.to_path_buf(),
    ));
    let server = Arc::new(IpcServer::new(store, engine, dir.to_path_buf()));
    let listener = UnixListener::bind(&socket_path).unwrap();
    let stop = Arc::new(Notify::new());
    let stop_clone = Arc::clone(&stop);
    let handle = tokio::spawn(async move { server.run(listener, stop_clone).await });
    (DaemonClient::at(socket_path), handle, stop)
}

async fn shutdown(handle: tokio::task::JoinHandle<()>, stop: Arc<Notify>) {
    stop.notify_one();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn register_then_list_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let (client, handle, stop) = running_server(dir.path()).await;

    let entry = client
        .register("cms", dir.path().to_path_buf(), "service.yaml")
        .await
        .unwrap();
    assert_eq!(entry.name, "cms");

    let all = client.list_catalog().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "cms");

    assert!(client.is_registered("cms").await.unwrap());
    assert!(!client.is_registered("missing").await.unwrap());

    shutdown(handle, stop).await;
}

#[tokio::test]
async fn get_catalog_entry_for_unknown_service_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (client, handle, stop) = running_server(dir.path()).await;

    let err = client.get_catalog_entry("ghost").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(_)));

    shutdown(handle, stop).await;
}

#[tokio::test]
async fn unregister_reports_whether_anything_was_removed() {
    let dir = tempfile::tempdir().unwrap();
    let (client, handle, stop) = running_server(dir.path()).await;

    client
        .register("cms", dir.path().to_path_buf(), "service.yaml")
        .await
        .unwrap();

    assert!(client.unregister("cms").await.unwrap());
    assert!(!client.unregister("cms").await.unwrap());

    shutdown(handle, stop).await;
}

#[tokio::test]
async fn connect_fails_fast_when_socket_is_absent() {
    // `connect()` resolves the socket path from the configured state
    // directory, which in a test environment with no daemon running
    // never exists — exercised indirectly via `DaemonNotRunning`'s Display.
    let missing = std::path::PathBuf::from("/nonexistent/eos.sock");
    let err = ClientError::DaemonNotRunning(missing.clone());
    assert!(err.to_string().contains("not running"));
}
