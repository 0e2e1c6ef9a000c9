use std::io::{self, Write};
use std::path::PathBuf;

/// Invalid configuration input.
///
/// Never surfaced to callers: the resolver substitutes the documented
/// default and carries on. The variants exist so the substitution can be
/// reported and tested.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown log level {0:?}, using INFO")]
    UnknownLevel(String),

    #[error("environment variable {0} is not valid unicode")]
    NotUnicode(String),
}

/// Failure to build or write through an output handler.
#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write log record: {0}")]
    Write(#[source] io::Error),

    #[error("failed to flush log output: {0}")]
    Flush(#[source] io::Error),
}

/// A custom field that was left out of an emitted record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("custom field {key:?} is not serializable: {reason}")]
    Unserializable { key: String, reason: String },

    #[error("custom field {0:?} collides with a reserved field")]
    Collision(String),

    #[error("the `custom` field must hold an object, got {0}")]
    CustomNotObject(&'static str),

    #[error("record could not be serialized, emitted standard fields only: {0}")]
    Degraded(String),
}

/// Catch-all raised inside the logger manager.
#[derive(thiserror::Error, Debug)]
pub enum LibraryError {
    #[error("logger setup panicked: {0}")]
    Panicked(String),
}

/// Best-effort diagnostic write to stderr.
///
/// Unlike `eprintln!`, a closed or broken stderr is ignored instead of
/// panicking inside the caller's logging call.
pub fn report(message: impl std::fmt::Display) {
    let stderr = io::stderr();
    let mut guard = stderr.lock();
    let _ = writeln!(guard, "tracing-json-log: {}", message);
}

/// Turn a caught panic payload into something printable.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
