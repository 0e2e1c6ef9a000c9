//! Structured single-line JSON logging.
//!
//! Every record is one JSON object carrying the standard fields
//! (`timestamp`, `level`, `message`, `module`, `filename`,
//! `function_name`, `line`) followed by caller-supplied custom fields. The
//! source location points at the application code that logged, never at
//! this crate. [`get_logger`] never fails: when setup goes wrong a
//! console-only fallback logger is returned.

pub mod config;
pub mod env;
pub mod error;
pub mod factory;
pub mod formatter;
pub mod handler;
pub mod init;
pub mod layer;
pub mod location;
pub mod logger;
mod macros;
pub mod manager;
pub mod record;

pub use config::{Level, LogConfiguration};
pub use formatter::StructuredFormatter;
pub use handler::{CaptureBuffer, ConsoleTarget, LogHandler};
pub use location::{Frame, LibraryBoundary, SourceLocation};
pub use logger::Logger;
pub use manager::{CallerModule, LoggerManager};
pub use record::{Fields, LogRecord};

/// Logger called `name`, configured from the environment on first use.
///
/// Repeated calls with the same resolved name return the same logger
/// without attaching handlers again.
pub fn get_logger(name: Option<&str>) -> Logger {
    LoggerManager::global().get_or_create_logger(name)
}
