use crate::config::{LogConfiguration, DEFAULT_APP_NAME};
use crate::error::{self, HandlerError};
use crate::formatter::StructuredFormatter;
use crate::handler::{ConsoleHandler, ConsoleTarget, FileHandler, LogHandler};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds the output handlers of a logger, all bound to one formatter.
#[derive(Clone)]
pub struct HandlerFactory {
    formatter: Arc<StructuredFormatter>,
    console: ConsoleTarget,
    temp_dir: PathBuf,
}

impl HandlerFactory {
    pub fn new(formatter: Arc<StructuredFormatter>, console: ConsoleTarget) -> Self {
        Self {
            formatter,
            console,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Directory tried when the configured one cannot be created.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn console_handler(&self) -> ConsoleHandler {
        ConsoleHandler::new(self.formatter.clone(), self.console.clone())
    }

    /// File handler for `config`, or `None` when file output is off or
    /// could not be set up. Failures are reported, never returned.
    pub fn file_handler(&self, config: &LogConfiguration, now: DateTime<Utc>) -> Option<FileHandler> {
        if !config.log_to_file {
            return None;
        }
        match self.try_file_handler(config, now) {
            Ok(handler) => Some(handler),
            Err(e) => {
                error::report(format_args!("file logging disabled: {}", e));
                None
            }
        }
    }

    /// Console handler always, file handler when configured and available.
    pub fn build(&self, config: &LogConfiguration) -> Vec<Arc<dyn LogHandler>> {
        let mut handlers: Vec<Arc<dyn LogHandler>> = vec![Arc::new(self.console_handler())];
        if let Some(file) = self.file_handler(config, Utc::now()) {
            handlers.push(Arc::new(file));
        }
        handlers
    }

    fn try_file_handler(&self, config: &LogConfiguration, now: DateTime<Utc>) -> Result<FileHandler, HandlerError> {
        let dir = match ensure_dir(&config.log_dir) {
            Ok(()) => config.log_dir.clone(),
            Err(e) => {
                error::report(format_args!("{}, retrying in {}", e, self.temp_dir.display()));
                ensure_dir(&self.temp_dir)?;
                self.temp_dir.clone()
            }
        };
        let path = dir.join(log_file_name(&config.app_name, now));
        FileHandler::open(self.formatter.clone(), path)
    }
}

/// `{app_name}_{YYYYMMDD}_{HH}.log`, one file per app per UTC hour.
pub fn log_file_name(app_name: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}.log", sanitize_file_stem(app_name), now.format("%Y%m%d_%H"))
}

/// Replace characters that cannot appear in a file name with `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.chars().all(|c| c == '_' || c == '.') {
        DEFAULT_APP_NAME.to_string()
    } else {
        cleaned
    }
}

fn ensure_dir(dir: &Path) -> Result<(), HandlerError> {
    std::fs::create_dir_all(dir).map_err(|source| HandlerError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn factory() -> HandlerFactory {
        HandlerFactory::new(Arc::new(StructuredFormatter::default()), ConsoleTarget::Stdout)
    }

    fn file_config(app: &str, dir: &Path) -> LogConfiguration {
        LogConfiguration {
            app_name: app.to_string(),
            log_to_file: true,
            log_dir: dir.to_path_buf(),
            ..LogConfiguration::default()
        }
    }

    #[test]
    fn file_name_uses_hour_bucket() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 59, 59).unwrap();
        assert_eq!(log_file_name("svc", now), "svc_20240309_07.log");
    }

    #[test]
    fn hostile_names_are_sanitized() {
        assert_eq!(sanitize_file_stem("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_file_stem("line\nbreak\ttab"), "line_break_tab");
        assert_eq!(sanitize_file_stem("../"), DEFAULT_APP_NAME);
        assert_eq!(sanitize_file_stem("   "), DEFAULT_APP_NAME);
        assert_eq!(sanitize_file_stem("日志-🚀"), "日志-🚀");
    }

    #[test]
    fn no_file_handler_unless_configured() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = file_config("svc", dir.path());
        config.log_to_file = false;
        assert!(factory().file_handler(&config, Utc::now()).is_none());
        assert_eq!(factory().build(&config).len(), 1);
    }

    #[test]
    fn missing_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("logs");
        let handler = factory()
            .file_handler(&file_config("svc", &dir), Utc::now())
            .expect("handler");
        assert!(handler.path().starts_with(&dir));
        assert_eq!(factory().build(&file_config("svc", &dir)).len(), 2);
    }

    #[test]
    fn falls_back_to_temp_dir() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let fallback = root.path().join("fallback");

        let handler = factory()
            .with_temp_dir(&fallback)
            .file_handler(&file_config("svc", &blocker.join("logs")), Utc::now())
            .expect("fallback handler");
        assert!(handler.path().starts_with(&fallback));
    }

    #[test]
    fn gives_up_when_both_directories_fail() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let factory = factory().with_temp_dir(blocker.join("tmp"));
        let config = file_config("svc", &blocker.join("logs"));
        assert!(factory.file_handler(&config, Utc::now()).is_none());
        assert_eq!(factory.build(&config).len(), 1);
    }
}
