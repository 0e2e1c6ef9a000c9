#![allow(dead_code)]

use serde_json::{Map, Value};
use tracing_json_log::env::MapEnv;
use tracing_json_log::{CaptureBuffer, ConsoleTarget, LoggerManager};

pub const STANDARD_FIELDS: [&str; 7] = [
    "timestamp",
    "level",
    "message",
    "module",
    "filename",
    "function_name",
    "line",
];

/// Manager isolated from the process environment, console captured.
pub fn capture_manager(env: MapEnv) -> (LoggerManager, CaptureBuffer) {
    let buffer = CaptureBuffer::new();
    let manager = LoggerManager::builder()
        .env(env)
        .console(ConsoleTarget::Capture(buffer.clone()))
        .build();
    (manager, buffer)
}

pub fn parse_line(line: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(map)) => map,
        other => panic!("not a JSON object: {line:?} ({other:?})"),
    }
}

pub fn records(buffer: &CaptureBuffer) -> Vec<Map<String, Value>> {
    buffer.lines().iter().map(|line| parse_line(line)).collect()
}

/// The checks every emitted line must pass.
pub fn assert_well_formed(record: &Map<String, Value>) {
    for key in STANDARD_FIELDS {
        assert!(record.contains_key(key), "missing {key} in {record:?}");
    }
    assert!(record["line"].is_u64(), "line must be an integer: {record:?}");
    let ts = record["timestamp"].as_str().expect("timestamp string");
    assert!(ts.contains('T') && ts.ends_with('Z'), "bad timestamp {ts}");
}
