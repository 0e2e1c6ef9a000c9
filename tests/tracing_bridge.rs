//! `tracing` events routed through a logger's handlers.

use tracing_json_log::env::{self, MapEnv};
use tracing_json_log::init;
use tracing_json_log::{CaptureBuffer, ConsoleTarget, LibraryBoundary, LoggerManager};

mod common;

use common::{assert_well_formed, capture_manager, records};

mod facade {
    /// Stands in for an application's own logging wrapper.
    pub fn report_failure(reason: &str) {
        tracing::error!(reason, "operation failed");
    }
}

#[test]
fn events_become_json_lines() {
    let (manager, buffer) = capture_manager(MapEnv::new());
    let logger = manager.get_or_create_logger(Some("bridge"));

    tracing::subscriber::with_default(init::subscriber(logger), || {
        tracing::info!(user_id = 7_u64, ratio = 0.5, admin = false, "signed in as {}", "ana");
    });

    let emitted = records(&buffer);
    assert_eq!(emitted.len(), 1);
    let record = &emitted[0];
    assert_well_formed(record);
    assert_eq!(record["level"], "INFO");
    assert_eq!(record["message"], "signed in as ana");
    assert_eq!(record["module"], "tracing_bridge");
    assert_eq!(record["filename"], "tests/tracing_bridge.rs");
    assert_eq!(record["user_id"], 7);
    assert_eq!(record["ratio"], 0.5);
    assert_eq!(record["admin"], false);
}

#[test]
fn level_threshold_applies_to_events() {
    let (manager, buffer) = capture_manager(MapEnv::new().with(env::LOG_LEVEL_ENV, "warning"));
    let logger = manager.get_or_create_logger(Some("bridge-level"));

    tracing::subscriber::with_default(init::subscriber(logger), || {
        tracing::trace!("t");
        tracing::debug!("d");
        tracing::info!("i");
        tracing::warn!("w");
        tracing::error!("e");
    });

    let levels: Vec<String> = records(&buffer)
        .iter()
        .map(|r| r["level"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(levels, vec!["WARNING", "ERROR"]);
}

#[test]
fn enclosing_span_names_the_function() {
    let (manager, buffer) = capture_manager(MapEnv::new());
    let logger = manager.get_or_create_logger(Some("bridge-span"));

    tracing::subscriber::with_default(init::subscriber(logger), || {
        let span = tracing::info_span!("checkout");
        let _guard = span.enter();
        tracing::warn!(order = "o-1", "card declined");
    });

    let record = &records(&buffer)[0];
    assert_eq!(record["function_name"], "checkout");
    assert_eq!(record["order"], "o-1");
}

#[test]
fn facade_modules_are_skipped_up_to_the_span() {
    let buffer = CaptureBuffer::new();
    let manager = LoggerManager::builder()
        .env(MapEnv::new())
        .console(ConsoleTarget::Capture(buffer.clone()))
        .boundary(LibraryBoundary::default().with_module("tracing_bridge::facade"))
        .build();
    let logger = manager.get_or_create_logger(Some("bridge-facade"));

    let span_line = line!() + 2;
    tracing::subscriber::with_default(init::subscriber(logger), || {
        let span = tracing::info_span!("import_orders");
        let _guard = span.enter();
        facade::report_failure("bad csv");
    });

    let record = &records(&buffer)[0];
    assert_eq!(record["function_name"], "import_orders");
    assert_eq!(record["module"], "tracing_bridge");
    assert_eq!(record["line"], span_line);
    assert_eq!(record["reason"], "bad csv");
}

#[test]
fn event_outside_any_span_has_unknown_function() {
    let (manager, buffer) = capture_manager(MapEnv::new());
    let logger = manager.get_or_create_logger(Some("bridge-bare"));

    tracing::subscriber::with_default(init::subscriber(logger), || {
        tracing::error!(error = %std::io::Error::new(std::io::ErrorKind::Other, "eof"), "read failed");
    });

    let record = &records(&buffer)[0];
    assert_eq!(record["function_name"], "unknown");
    assert_eq!(record["error"], "eof");
}
