use crate::env::{self, EnvSource};
use crate::error::{self, ConfigError};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Name used when nothing else identifies the application.
pub const DEFAULT_APP_NAME: &str = "app";

/// Directory used for log files when `LOG_FILE_DIR` is unset.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Severity of a record. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warning,
        Level::Error,
        Level::Critical,
    ];

    /// Upper-case name used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    /// Case-insensitive match against the five level names.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::UnknownLevel(raw.to_string()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient boolean parsing: a handful of truthy spellings, anything else is
/// false.
pub fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "on" | "t"
    )
}

/// Resolved settings for one logger. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfiguration {
    pub app_name: String,
    pub level: Level,
    pub log_to_file: bool,
    pub log_dir: PathBuf,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            level: Level::Info,
            log_to_file: false,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl LogConfiguration {
    /// Build a configuration for an already resolved app name.
    ///
    /// Unknown levels and unparsable booleans are coerced to their defaults;
    /// this never fails. The directory is not checked here, the file handler
    /// deals with missing or unwritable directories.
    pub fn resolve(app_name: impl Into<String>, source: &dyn EnvSource) -> Self {
        let (config, issues) = Self::resolve_detailed(app_name, source);
        for issue in &issues {
            error::report(issue);
        }
        config
    }

    /// Like [`LogConfiguration::resolve`], also returning the values that
    /// were replaced by defaults instead of reporting them.
    pub fn resolve_detailed(app_name: impl Into<String>, source: &dyn EnvSource) -> (Self, Vec<ConfigError>) {
        let mut issues = Vec::new();
        let level = match source.var(env::LOG_LEVEL_ENV).map(|raw| Level::parse(&raw)) {
            Some(Ok(level)) => level,
            Some(Err(e)) => {
                issues.push(e);
                Level::default()
            }
            None => Level::Info,
        };

        let log_to_file = source
            .var(env::LOG_TO_FILE_ENV)
            .map(|raw| parse_bool(&raw))
            .unwrap_or(false);

        let log_dir = source
            .var(env::LOG_FILE_DIR_ENV)
            .filter(|raw| !raw.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        let config = Self {
            app_name: app_name.into(),
            level,
            log_to_file,
            log_dir,
        };
        (config, issues)
    }

    /// Console-only settings used by the fallback logger.
    pub fn console_only(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ..Self::default()
        }
    }
}
