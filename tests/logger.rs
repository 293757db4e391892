//! Logger behaviour observed through its sinks.

use std::collections::HashSet;
use std::fs::File;
use std::process::Command;
use std::thread;

use blog_service::logger::{Logger, WriterSink};
use blog_service::{fields, infof};

mod common;

/// Set in the child process spawned by `fatal_writes_record_before_exit`.
const FATAL_SINK_ENV: &str = "BLOG_SERVICE_FATAL_SINK";

#[test]
fn infof_writes_one_json_line() {
    let (root, sink) = common::memory_logger();
    let logger = root.with_fields(fields! { "request_id" => "abc" });
    infof!(logger, "user {} logged in", "alice");

    let records = common::records(&sink);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], "Info");
    assert_eq!(records[0]["message"], "user alice logged in");
    assert_eq!(records[0]["request_id"], "abc");

    let callers = records[0]["callers"].as_array().unwrap();
    assert!(!callers.is_empty());
    assert!(callers[0].as_str().unwrap().starts_with("tests/logger.rs: "));
}

#[test]
fn concurrent_derivations_do_not_mix() {
    let (root, sink) = common::memory_logger();

    let handles: Vec<_> = ["left", "right"]
        .into_iter()
        .map(|side| {
            let root = root.clone();
            thread::spawn(move || {
                root.with_fields(fields! { "side" => side, format!("only_{}", side) => true })
                    .info(side);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let records = common::records(&sink);
    assert_eq!(records.len(), 2);

    let mut sides = HashSet::new();
    for record in &records {
        let side = record["side"].as_str().unwrap();
        let other = if side == "left" { "right" } else { "left" };
        assert_eq!(record["message"], side);
        assert_eq!(record[format!("only_{}", side)], true);
        assert!(record.get(format!("only_{}", other)).is_none());
        sides.insert(side.to_string());
    }
    assert_eq!(sides.len(), 2);
    assert!(root.fields().is_empty());
}

#[test]
fn many_threads_share_one_sink() {
    let (root, sink) = common::memory_logger();

    thread::scope(|scope| {
        for worker in 0..8 {
            let root = &root;
            scope.spawn(move || {
                let logger = root.with_field("worker", worker);
                for n in 0..25 {
                    logger.debugf(format_args!("tick {}", n));
                }
            });
        }
    });

    let records = common::records(&sink);
    assert_eq!(records.len(), 200);
    assert!(records.iter().all(|r| r["level"] == "debug"));
}

#[test]
fn panic_level_is_recoverable() {
    let (root, sink) = common::memory_logger();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        root.panicf(format_args!("index {} corrupt", 3));
    }));
    let message = outcome
        .unwrap_err()
        .downcast::<String>()
        .map(|payload| *payload)
        .unwrap();
    assert_eq!(message, "index 3 corrupt");

    let records = common::records(&sink);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["level"], "Panic");
}

#[test]
fn fatal_writes_record_before_exit() {
    if let Ok(path) = std::env::var(FATAL_SINK_ENV) {
        let file = File::create(path).unwrap();
        let logger = Logger::new(WriterSink::new(file));
        logger.with_field("volume", "/var/lib/mysql").fatal("disk full");
        unreachable!("fatal returned");
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fatal.log");
    let status = Command::new(std::env::current_exe().unwrap())
        .args(["fatal_writes_record_before_exit", "--exact", "--test-threads=1"])
        .env(FATAL_SINK_ENV, &path)
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["level"], "Fatal");
    assert_eq!(record["message"], "disk full");
    assert_eq!(record["volume"], "/var/lib/mysql");
}
