use super::*;
use chrono::Utc;

#[test]
fn new_runtime_starts_at_zero_restarts() {
    let rt = ServiceRuntime::new("cms", Utc::now());
    assert_eq!(rt.restart_count, 0);
    assert!(rt.started_at.is_none());
}

#[test]
fn empty_update_is_detected() {
    assert!(RuntimeUpdate::default().is_empty());
    let update = RuntimeUpdate {
        restart_count: Some(1),
        ..Default::default()
    };
    assert!(!update.is_empty());
}
