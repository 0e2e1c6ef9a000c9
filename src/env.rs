//! Environment variable names read when a logger is configured.
//!
//! Access goes through [`EnvSource`] so the resolver can be fed either the
//! real process environment or a fixed map.

use std::collections::HashMap;

/// Logical application name, also used as the logger name and the log file
/// prefix.
pub const APP_NAME_ENV: &str = "APP_NAME";

/// Minimum level: `DEBUG`, `INFO`, `WARNING`, `ERROR` or `CRITICAL`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Boolean-like switch enabling file output.
pub const LOG_TO_FILE_ENV: &str = "LOG_TO_FILE";

/// Directory receiving log files.
pub const LOG_FILE_DIR_ENV: &str = "LOG_FILE_DIR";

/// Read-only view of environment variables.
pub trait EnvSource: Send + Sync {
    /// Value of `key`, or `None` when unset or unreadable.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(std::env::VarError::NotPresent) => None,
            Err(std::env::VarError::NotUnicode(_)) => {
                crate::error::report(crate::error::ConfigError::NotUnicode(key.to_string()));
                None
            }
        }
    }
}

/// Fixed set of variables, independent of the process environment.
#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_env_lookup_and_default() {
        let env = MapEnv::new().with(LOG_LEVEL_ENV, "debug");
        assert_eq!(env.var(LOG_LEVEL_ENV).as_deref(), Some("debug"));
        assert_eq!(env.var(APP_NAME_ENV), None);
    }

    #[test]
    fn map_env_collects_from_pairs() {
        let env: MapEnv = [(LOG_TO_FILE_ENV, "yes"), (LOG_FILE_DIR_ENV, "/tmp/x")]
            .into_iter()
            .collect();
        assert_eq!(env.var(LOG_FILE_DIR_ENV).as_deref(), Some("/tmp/x"));
    }
}
