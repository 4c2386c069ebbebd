use super::*;
use eos_core::SystemClock;
use eos_store::MemoryStore;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn server_with_store(store: Arc<dyn Store>, base: &std::path::Path) -> Arc<IpcServer> {
    let engine = Arc::new(LifecycleEngine::new(
        Arc::clone(&store),
        SystemClock,
        base.to_path_buf(),
    ));
    Arc::new(IpcServer::new(store, engine, base.to_path_buf()))
}

async fn roundtrip(socket_path: &std::path::Path, request: &Request) -> Envelope {
    let mut stream = UnixStream::connect(socket_path).await.unwrap();
    let bytes = wire::encode(request).unwrap();
    wire::write_message(&mut stream, &bytes).await.unwrap();
    let response_bytes = wire::read_message(&mut stream).await.unwrap();
    wire::decode(&response_bytes).unwrap()
}

#[tokio::test]
async fn unknown_catalog_entry_round_trips_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("eos.sock");
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let server = server_with_store(Arc::clone(&store), dir.path());
    let listener = UnixListener::bind(&socket_path).unwrap();
    let stop = Arc::new(Notify::new());
    let stop_clone = Arc::clone(&stop);
    let handle = tokio::spawn(async move { server.run(listener, stop_clone).await });

    let envelope = roundtrip(
        &socket_path,
        &Request::GetServiceCatalogEntry(NameArg {
            name: "missing".to_string(),
        }),
    )
    .await;

    assert!(!envelope.success);
    assert!(envelope.error.is_some());

    stop.notify_one();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn add_then_get_catalog_entry_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("eos.sock");
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let server = server_with_store(Arc::clone(&store), dir.path());
    let listener = UnixListener::bind(&socket_path).unwrap();
    let stop = Arc::new(Notify::new());
    let stop_clone = Arc::clone(&stop);
    let handle = tokio::spawn(async move { server.run(listener, stop_clone).await });

    let service = eos_core::ServiceCatalogEntry::new(
        "cms",
        dir.path().to_path_buf(),
        "service.yaml",
        chrono::Utc::now(),
    );
    let add = roundtrip(
        &socket_path,
        &Request::AddServiceCatalogEntry(AddCatalogArgs { service }),
    )
    .await;
    assert!(add.success, "{:?}", add.error);

    let registered = roundtrip(
        &socket_path,
        &Request::IsServiceRegistered(NameArg {
            name: "cms".to_string(),
        }),
    )
    .await;
    assert_eq!(registered.data, Some(serde_json::json!(true)));

    stop.notify_one();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn unknown_method_json_reports_unknown_method_error() {
    // A request envelope with a method name absent from the fixed set
    // fails to deserialize into `Request` (it's tagged on `method`), but
    // the connection handler distinguishes that from a malformed-args
    // decode error and reports the exact `unknown method: X` message (§4.4).
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("eos.sock");
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let server = server_with_store(Arc::clone(&store), dir.path());
    let listener = UnixListener::bind(&socket_path).unwrap();
    let stop = Arc::new(Notify::new());
    let stop_clone = Arc::clone(&stop);
    let handle = tokio::spawn(async move { server.run(listener, stop_clone).await });

    let mut stream = UnixStream::connect(&socket_path).await.unwrap();
    let raw = serde_json::to_vec(&serde_json::json!({"method": "NotARealMethod", "args": {}})).unwrap();
    wire::write_message(&mut stream, &raw).await.unwrap();
    let response_bytes = wire::read_message(&mut stream).await.unwrap();
    let envelope: Envelope = wire::decode(&response_bytes).unwrap();
    assert!(!envelope.success);
    assert_eq!(envelope.error.as_deref(), Some("unknown method: NotARealMethod"));

    stop.notify_one();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[tokio::test]
async fn recognized_method_with_malformed_args_reports_decode_error_not_unknown_method() {
    let dir = tempfile::tempdir().unwrap();
    let socket_path = dir.path().join("eos.sock");
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let server = server_with_store(Arc::clone(&store), dir.path());
    let listener = UnixListener::bind(&socket_path).unwrap();
    let stop = Arc::new(Notify::new());
    let stop_clone = Arc::clone(&stop);
    let handle = tokio::spawn(async move { server.run(listener, stop_clone).await });

    let mut stream = UnixStream::connect(&socket_path).await.unwrap();
    // StartService is recognized but args is missing the required `name` field.
    let raw = serde_json::to_vec(&serde_json::json!({"method": "StartService", "args": {}})).unwrap();
    wire::write_message(&mut stream, &raw).await.unwrap();
    let response_bytes = wire::read_message(&mut stream).await.unwrap();
    let envelope: Envelope = wire::decode(&response_bytes).unwrap();
    assert!(!envelope.success);
    let err = envelope.error.unwrap();
    assert!(err.starts_with("invalid args for method StartService:"), "{err}");

    stop.notify_one();
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;
}

#[test]
fn out_and_error_log_paths_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let server = server_with_store(store, dir.path());
    assert_ne!(
        server.out_log_path("cms"),
        server.error_log_path("cms")
    );
    assert_eq!(
        server.out_log_path("cms"),
        dir.path().join("logs").join("cms-out.log")
    );
}
