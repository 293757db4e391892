//! Shared utilities for integration tests.

use blog_service::logger::{Logger, MemorySink};
use serde_json::Value;

/// Root logger over an in-memory sink, plus a handle to read it back.
pub fn memory_logger() -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    (Logger::new(sink.clone()), sink)
}

/// Every line written so far, parsed as JSON.
pub fn records(sink: &MemorySink) -> Vec<Value> {
    sink.lines()
        .iter()
        .map(|line| serde_json::from_str(line).expect("log line is not JSON"))
        .collect()
}
