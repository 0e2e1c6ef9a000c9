use crate::config::{Level, LogConfiguration};
use crate::error::{self, panic_message};
use crate::handler::LogHandler;
use crate::location::Frame;
use crate::record::{Fields, LogRecord};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Field holding the error passed to [`Logger::exception`].
pub const EXCEPTION_FIELD: &str = "exception";

/// Field listing the `source()` chain of that error, outermost first.
pub const EXCEPTION_CAUSES_FIELD: &str = "exception_causes";

/// Handle to a configured logger. Cheap to clone; clones share handlers.
///
/// Every logging method captures its call site through `#[track_caller]`,
/// so wrapper functions that are themselves `#[track_caller]` are skipped
/// and the record points at the code that called them. A failing handler
/// is reported on stderr; logging methods never return errors or panic.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    config: LogConfiguration,
    handlers: Vec<Arc<dyn LogHandler>>,
}

impl Logger {
    /// Logger named after `config.app_name`, writing to `handlers`.
    pub fn new(config: LogConfiguration, handlers: Vec<Arc<dyn LogHandler>>) -> Self {
        Self {
            inner: Arc::new(LoggerInner { config, handlers }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.config.app_name
    }

    /// Minimum level that reaches the handlers.
    pub fn level(&self) -> Level {
        self.inner.config.level
    }

    pub fn config(&self) -> &LogConfiguration {
        &self.inner.config
    }

    pub fn handler_count(&self) -> usize {
        self.inner.handlers.len()
    }

    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.inner.config.level
    }

    /// True when both handles share the same handlers.
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Level::Debug, message, Fields::new());
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Level::Info, message, Fields::new());
    }

    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display) {
        self.log(Level::Warning, message, Fields::new());
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(Level::Error, message, Fields::new());
    }

    #[track_caller]
    pub fn critical(&self, message: impl fmt::Display) {
        self.log(Level::Critical, message, Fields::new());
    }

    #[track_caller]
    pub fn debug_with(&self, message: impl fmt::Display, fields: Fields) {
        self.log(Level::Debug, message, fields);
    }

    #[track_caller]
    pub fn info_with(&self, message: impl fmt::Display, fields: Fields) {
        self.log(Level::Info, message, fields);
    }

    #[track_caller]
    pub fn warning_with(&self, message: impl fmt::Display, fields: Fields) {
        self.log(Level::Warning, message, fields);
    }

    #[track_caller]
    pub fn error_with(&self, message: impl fmt::Display, fields: Fields) {
        self.log(Level::Error, message, fields);
    }

    #[track_caller]
    pub fn critical_with(&self, message: impl fmt::Display, fields: Fields) {
        self.log(Level::Critical, message, fields);
    }

    /// Log `err` at ERROR, with its message and `source()` chain attached as
    /// custom fields.
    #[track_caller]
    pub fn exception(&self, message: impl fmt::Display, err: &(dyn std::error::Error + 'static)) {
        let mut fields = Fields::new().with(EXCEPTION_FIELD, err.to_string());
        let causes: Vec<String> = std::iter::successors(err.source(), |e| e.source())
            .map(|e| e.to_string())
            .collect();
        if !causes.is_empty() {
            fields.insert(EXCEPTION_CAUSES_FIELD, causes);
        }
        self.log(Level::Error, message, fields);
    }

    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display, fields: Fields) {
        self.log_at(Frame::caller(), level, message, fields);
    }

    /// Log with an explicitly captured frame. Used by the crate's macros.
    pub fn log_at(&self, frame: Frame, level: Level, message: impl fmt::Display, fields: Fields) {
        if !self.is_enabled_for(level) {
            return;
        }
        let record = LogRecord::new(self.name(), level, message.to_string())
            .with_frame(frame)
            .with_fields(fields);
        self.emit(&record);
    }

    /// Hand a fully built record to every handler, subject to the level
    /// threshold.
    pub fn emit(&self, record: &LogRecord) {
        if !self.is_enabled_for(record.level) {
            return;
        }
        for handler in &self.inner.handlers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler.handle(record)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error::report(format_args!("logger {:?}: {}", self.name(), e)),
                Err(payload) => error::report(format_args!(
                    "logger {:?}: handler panicked: {}",
                    self.name(),
                    panic_message(&*payload)
                )),
            }
        }
    }

    /// Flush every handler. Failures are reported, not returned.
    pub fn flush(&self) {
        for handler in &self.inner.handlers {
            if let Err(e) = handler.flush() {
                error::report(format_args!("logger {:?}: {}", self.name(), e));
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name())
            .field("level", &self.level())
            .field("handlers", &self.handler_count())
            .finish()
    }
}
