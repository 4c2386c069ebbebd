use super::*;
use async_trait::async_trait;
use eos_core::{FakeClock, ProcessState};
use eos_store::MemoryStore;
use parking_lot::Mutex;
use std::sync::Arc;

/// A `ServiceManager` double that records calls and returns a scripted
/// result, so `check_failed` can be tested without a real lifecycle engine.
struct FakeManager {
    calls: Mutex<Vec<String>>,
    result: Mutex<Option<Result<u32, eos_lifecycle::LifecycleError>>>,
}

impl FakeManager {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            result: Mutex::new(Some(Ok(1))),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ServiceManager for FakeManager {
    async fn restart(
        &self,
        name: &str,
        _grace_period: std::time::Duration,
        _tick_period: std::time::Duration,
    ) -> Result<u32, eos_lifecycle::LifecycleError> {
        self.calls.lock().push(name.to_string());
        self.result
            .lock()
            .take()
            .unwrap_or(Ok(1))
    }
}

fn monitor_with(
    store: Arc<dyn Store>,
    manager: Arc<dyn ServiceManager>,
    clock: FakeClock,
    base: &tempfile::TempDir,
) -> HealthMonitor<FakeClock> {
    HealthMonitor::new(
        store,
        manager,
        clock,
        base.path().to_path_buf(),
        HealthMonitorConfig::default(),
    )
}

fn seed(store: &MemoryStore, name: &str) -> u32 {
    store
        .register_service(name, std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime(name).unwrap();
    let entry = store.register_process(4242, name, ProcessState::Unknown);
    entry.pid
}

#[tokio::test]
async fn check_start_promotes_to_running_when_alive_and_under_timeout() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let pid = std::process::id();
    store
        .register_service("cms", std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime("cms").unwrap();
    store.register_process(pid, "cms", ProcessState::Unknown);
    store
        .update_process(
            pid,
            ProcessUpdate {
                state: Some(ProcessState::Starting),
                started_at: Some(clock.now()),
                ..Default::default()
            },
        )
        .unwrap();

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let monitor = monitor_with(
        Arc::clone(&store),
        Arc::new(FakeManager::new()),
        clock,
        &base,
    );

    monitor.tick_once().await;

    let entry = store.get_process_by_pid(pid).unwrap();
    assert_eq!(entry.state, ProcessState::Running);
    assert!(entry.error.is_none());
}

#[tokio::test]
async fn check_start_fails_service_when_process_already_dead() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let dead_pid = 999_999;
    store
        .register_service("cms", std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime("cms").unwrap();
    store.register_process(dead_pid, "cms", ProcessState::Unknown);
    store
        .update_process(
            dead_pid,
            ProcessUpdate {
                state: Some(ProcessState::Starting),
                started_at: Some(clock.now()),
                ..Default::default()
            },
        )
        .unwrap();

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let monitor = monitor_with(
        Arc::clone(&store),
        Arc::new(FakeManager::new()),
        clock,
        &base,
    );

    monitor.tick_once().await;

    let entry = store.get_process_by_pid(dead_pid).unwrap();
    assert_eq!(entry.state, ProcessState::Failed);
    assert!(entry.error.as_deref().unwrap().contains("died during startup"));
    assert!(entry.stopped_at.is_some());
}

#[tokio::test]
async fn check_start_fails_service_after_timeout_limit_elapses() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let pid = std::process::id();
    store
        .register_service("cms", std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime("cms").unwrap();
    store.register_process(pid, "cms", ProcessState::Unknown);
    store
        .update_process(
            pid,
            ProcessUpdate {
                state: Some(ProcessState::Starting),
                started_at: Some(clock.now()),
                ..Default::default()
            },
        )
        .unwrap();

    clock.advance(chrono::Duration::seconds(31));

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let monitor = monitor_with(
        Arc::clone(&store),
        Arc::new(FakeManager::new()),
        clock,
        &base,
    );

    monitor.tick_once().await;

    let entry = store.get_process_by_pid(pid).unwrap();
    assert_eq!(entry.state, ProcessState::Failed);
    assert!(entry
        .error
        .as_deref()
        .unwrap()
        .contains("taking too long to start"));
}

#[tokio::test]
async fn check_running_transitions_to_failed_when_process_is_gone() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let dead_pid = 999_998;
    store
        .register_service("cms", std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime("cms").unwrap();
    store.register_process(dead_pid, "cms", ProcessState::Unknown);
    store
        .update_process(
            dead_pid,
            ProcessUpdate {
                state: Some(ProcessState::Running),
                started_at: Some(clock.now()),
                ..Default::default()
            },
        )
        .unwrap();

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let monitor = monitor_with(
        Arc::clone(&store),
        Arc::new(FakeManager::new()),
        clock,
        &base,
    );

    monitor.tick_once().await;

    let entry = store.get_process_by_pid(dead_pid).unwrap();
    assert_eq!(entry.state, ProcessState::Failed);
    assert_eq!(entry.error.as_deref(), Some("service is not running"));
}

#[tokio::test]
async fn check_failed_recovers_without_incrementing_restart_count_when_alive() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let pid = std::process::id();
    store
        .register_service("cms", std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime("cms").unwrap();
    store.register_process(pid, "cms", ProcessState::Unknown);
    store
        .update_process(
            pid,
            ProcessUpdate {
                state: Some(ProcessState::Failed),
                error: Some(Some("service is not running".into())),
                started_at: Some(clock.now()),
                stopped_at: Some(clock.now()),
            },
        )
        .unwrap();

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let manager = Arc::new(FakeManager::new());
    let monitor = monitor_with(Arc::clone(&store), Arc::clone(&manager) as _, clock, &base);

    monitor.tick_once().await;

    let entry = store.get_process_by_pid(pid).unwrap();
    assert_eq!(entry.state, ProcessState::Running);
    assert!(entry.error.is_none());
    assert_eq!(manager.call_count(), 0);
    assert_eq!(store.get_runtime("cms").unwrap().restart_count, 0);
}

#[tokio::test]
async fn check_failed_restarts_once_backoff_window_has_elapsed() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let dead_pid = 999_997;
    store
        .register_service("cms", std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime("cms").unwrap();
    store.register_process(dead_pid, "cms", ProcessState::Unknown);
    store
        .update_process(
            dead_pid,
            ProcessUpdate {
                state: Some(ProcessState::Failed),
                error: Some(Some("service is not running".into())),
                started_at: Some(clock.now()),
                stopped_at: Some(clock.now()),
            },
        )
        .unwrap();

    // required_delay(0) == 300ms
    clock.advance(chrono::Duration::milliseconds(301));

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let manager = Arc::new(FakeManager::new());
    let monitor = monitor_with(Arc::clone(&store), Arc::clone(&manager) as _, clock, &base);

    monitor.tick_once().await;

    assert_eq!(manager.call_count(), 1);
}

#[tokio::test]
async fn check_failed_does_not_restart_before_backoff_window_elapses() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let dead_pid = 999_996;
    store
        .register_service("cms", std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime("cms").unwrap();
    store.register_process(dead_pid, "cms", ProcessState::Unknown);
    store
        .update_process(
            dead_pid,
            ProcessUpdate {
                state: Some(ProcessState::Failed),
                error: Some(Some("service is not running".into())),
                started_at: Some(clock.now()),
                stopped_at: Some(clock.now()),
            },
        )
        .unwrap();

    clock.advance(chrono::Duration::milliseconds(100));

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let manager = Arc::new(FakeManager::new());
    let monitor = monitor_with(Arc::clone(&store), Arc::clone(&manager) as _, clock, &base);

    monitor.tick_once().await;

    assert_eq!(manager.call_count(), 0);
}

#[tokio::test]
async fn check_failed_stops_restarting_once_max_restart_is_reached() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let dead_pid = 999_995;
    store
        .register_service("cms", std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime("cms").unwrap();
    store
        .update_runtime(
            "cms",
            eos_core::RuntimeUpdate {
                restart_count: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
    store.register_process(dead_pid, "cms", ProcessState::Unknown);
    store
        .update_process(
            dead_pid,
            ProcessUpdate {
                state: Some(ProcessState::Failed),
                error: Some(Some("service is not running".into())),
                started_at: Some(clock.now()),
                stopped_at: Some(clock.now()),
            },
        )
        .unwrap();

    clock.advance(chrono::Duration::minutes(5));

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let manager = Arc::new(FakeManager::new());
    let monitor = monitor_with(Arc::clone(&store), Arc::clone(&manager) as _, clock, &base);

    monitor.tick_once().await;

    assert_eq!(manager.call_count(), 0);
}

#[tokio::test]
async fn check_unknown_promotes_alive_process_to_running() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let pid = std::process::id();
    seed_with_pid(&store, "cms", pid);

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let monitor = monitor_with(
        Arc::clone(&store),
        Arc::new(FakeManager::new()),
        clock,
        &base,
    );

    monitor.tick_once().await;

    let entry = store.get_process_by_pid(pid).unwrap();
    assert_eq!(entry.state, ProcessState::Running);
}

#[tokio::test]
async fn check_unknown_marks_dead_process_as_failed() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let dead_pid = 999_994;
    seed_with_pid(&store, "cms", dead_pid);

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let monitor = monitor_with(
        Arc::clone(&store),
        Arc::new(FakeManager::new()),
        clock,
        &base,
    );

    monitor.tick_once().await;

    let entry = store.get_process_by_pid(dead_pid).unwrap();
    assert_eq!(entry.state, ProcessState::Failed);
}

#[tokio::test]
async fn stopped_processes_are_never_redispatched() {
    let store = MemoryStore::new();
    let clock = FakeClock::default();
    let pid = seed(&store, "cms");
    store
        .update_process(
            pid,
            ProcessUpdate {
                state: Some(ProcessState::Stopped),
                stopped_at: Some(clock.now()),
                ..Default::default()
            },
        )
        .unwrap();

    let store: Arc<dyn Store> = Arc::new(store);
    let base = tempfile::tempdir().unwrap();
    let manager = Arc::new(FakeManager::new());
    let monitor = monitor_with(Arc::clone(&store), Arc::clone(&manager) as _, clock, &base);

    monitor.tick_once().await;

    let entry = store.get_process_by_pid(pid).unwrap();
    assert_eq!(entry.state, ProcessState::Stopped);
    assert_eq!(manager.call_count(), 0);
}

fn seed_with_pid(store: &MemoryStore, name: &str, pid: u32) {
    store
        .register_service(name, std::env::temp_dir(), "service.yaml")
        .unwrap();
    store.register_runtime(name).unwrap();
    store.register_process(pid, name, ProcessState::Unknown);
}
