use super::*;

#[test]
fn writes_timestamped_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.log");
    let logger = DaemonLogger::open(&path, 1_000_000).unwrap();
    logger.log(LogLevel::Info, "booted").unwrap();
    logger.log(LogLevel::Error, "oh no").unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("INFO: booted"));
    assert!(lines[1].contains("ERROR: oh no"));
}

#[test]
fn rotates_when_max_size_exceeded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.log");
    // Small cap so a couple of lines force rotation.
    let logger = DaemonLogger::open(&path, 40).unwrap();
    for i in 0..5 {
        logger.log(LogLevel::Info, &format!("line {i}")).unwrap();
    }

    assert!(path.exists());
    assert!(dir.path().join("daemon.log.1").exists());
}

#[test]
fn rotation_shifts_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daemon.log");
    std::fs::write(&path, "old content that is reasonably long for a test\n").unwrap();
    std::fs::write(dir.path().join("daemon.log.1"), "oldest\n").unwrap();

    let logger = DaemonLogger::open(&path, 10).unwrap();
    logger.log(LogLevel::Warn, "new").unwrap();

    assert!(dir.path().join("daemon.log.2").exists());
    let shifted = std::fs::read_to_string(dir.path().join("daemon.log.2")).unwrap();
    assert_eq!(shifted, "oldest\n");
}

#[test]
fn service_log_sink_appends_supervisor_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("cms-error.log");
    let sink = ServiceLogSink::open(&path).unwrap();
    sink.write_supervisor_line("service cms died during startup").unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("[HEALTH MONITOR] service cms died during startup"));
}

#[test]
fn open_service_log_creates_parent_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("cms-out.log");
    assert!(!path.parent().unwrap().exists());
    let _file = open_service_log(&path).unwrap();
    assert!(path.parent().unwrap().exists());
}
