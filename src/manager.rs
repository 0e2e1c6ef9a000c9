use crate::config::{LogConfiguration, DEFAULT_APP_NAME};
use crate::env::{self, EnvSource, ProcessEnv};
use crate::error::{self, panic_message, LibraryError};
use crate::factory::HandlerFactory;
use crate::formatter::StructuredFormatter;
use crate::handler::{ConsoleTarget, LogHandler};
use crate::location::LibraryBoundary;
use crate::logger::Logger;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Name of the console-only logger handed out when setup fails.
pub const FALLBACK_LOGGER_NAME: &str = "fallback";

static GLOBAL: OnceLock<LoggerManager> = OnceLock::new();

/// Module that asked for a logger, as captured by the `get_logger!` macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerModule {
    pub module: &'static str,
    pub file: &'static str,
}

impl CallerModule {
    /// Crate root of a binary (`src/main.rs`, `src/bin/*.rs`, example
    /// targets): says nothing about which part of the application is
    /// logging, so it is not used as a logger name. Library roots are
    /// recognized by their `lib.rs` file.
    pub fn is_entry_point(&self) -> bool {
        let is_crate_root = !self.module.contains("::");
        let file_name = self.file.rsplit(['/', '\\']).next().unwrap_or(self.file);
        is_crate_root && file_name != "lib.rs"
    }
}

/// Owns the set of configured loggers.
///
/// Each logger name is wired with handlers at most once; later requests for
/// the same name get the stored handle back. The check and the insert happen
/// under one lock, so concurrent first calls still configure once.
pub struct LoggerManager {
    env: Arc<dyn EnvSource>,
    factory: HandlerFactory,
    registry: Mutex<HashMap<String, Logger>>,
}

impl Default for LoggerManager {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LoggerManager {
    /// Manager reading the process environment and writing to stdout.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> LoggerManagerBuilder {
        LoggerManagerBuilder::default()
    }

    /// Process-wide manager behind [`crate::get_logger`].
    pub fn global() -> &'static LoggerManager {
        GLOBAL.get_or_init(LoggerManager::new)
    }

    /// Return the logger for `name`, configuring it on first use.
    ///
    /// Never fails and never panics: any problem during setup is reported on
    /// stderr and the fallback logger is returned instead.
    pub fn get_or_create_logger(&self, name: Option<&str>) -> Logger {
        self.get_or_create_logger_from(name, None)
    }

    /// Same as [`LoggerManager::get_or_create_logger`], using `caller` when
    /// neither an explicit name nor `APP_NAME` is available.
    pub fn get_or_create_logger_from(&self, name: Option<&str>, caller: Option<CallerModule>) -> Logger {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let name = self.resolve_name(name, caller);
            self.try_get_or_create(name)
        }))
        .unwrap_or_else(|payload| Err(LibraryError::Panicked(panic_message(&*payload))));

        match outcome {
            Ok(logger) => logger,
            Err(e) => {
                error::report(format_args!("logger setup failed, using fallback: {}", e));
                self.fallback_logger()
            }
        }
    }

    /// Explicit name → `APP_NAME` → calling module → default.
    pub fn resolve_name(&self, explicit: Option<&str>, caller: Option<CallerModule>) -> String {
        explicit
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.env
                    .var(env::APP_NAME_ENV)
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
            })
            .or_else(|| {
                caller
                    .filter(|caller| !caller.is_entry_point())
                    .map(|caller| caller.module.to_string())
            })
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string())
    }

    pub fn is_configured(&self, name: &str) -> bool {
        self.registry().contains_key(name)
    }

    /// Names configured so far, sorted.
    pub fn configured_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry().keys().cloned().collect();
        names.sort();
        names
    }

    /// Console-only logger with default settings, configured once.
    pub fn fallback_logger(&self) -> Logger {
        let mut registry = self.registry();
        registry
            .entry(FALLBACK_LOGGER_NAME.to_string())
            .or_insert_with(|| {
                let console: Arc<dyn LogHandler> = Arc::new(self.factory.console_handler());
                Logger::new(LogConfiguration::console_only(FALLBACK_LOGGER_NAME), vec![console])
            })
            .clone()
    }

    fn try_get_or_create(&self, name: String) -> Result<Logger, LibraryError> {
        let mut registry = self.registry();
        if let Some(existing) = registry.get(&name) {
            return Ok(existing.clone());
        }

        let config = LogConfiguration::resolve(name.as_str(), &*self.env);
        let handlers = self.factory.build(&config);
        let logger = Logger::new(config, handlers);
        registry.insert(name, logger.clone());
        Ok(logger)
    }

    // A panic while configuring happens before the insert, so a poisoned map
    // is still consistent.
    fn registry(&self) -> MutexGuard<'_, HashMap<String, Logger>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builder for [`LoggerManager`], mostly to isolate tests from the process
/// environment and stdout.
pub struct LoggerManagerBuilder {
    env: Arc<dyn EnvSource>,
    console: ConsoleTarget,
    boundary: LibraryBoundary,
    temp_dir: Option<PathBuf>,
}

impl Default for LoggerManagerBuilder {
    fn default() -> Self {
        Self {
            env: Arc::new(ProcessEnv),
            console: ConsoleTarget::Stdout,
            boundary: LibraryBoundary::default(),
            temp_dir: None,
        }
    }
}

impl LoggerManagerBuilder {
    pub fn env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn console(mut self, console: ConsoleTarget) -> Self {
        self.console = console;
        self
    }

    pub fn boundary(mut self, boundary: LibraryBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Override the directory used when the configured log directory cannot
    /// be created. Defaults to `std::env::temp_dir()`.
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> LoggerManager {
        let formatter = Arc::new(StructuredFormatter::new(self.boundary));
        let mut factory = HandlerFactory::new(formatter, self.console);
        if let Some(dir) = self.temp_dir {
            factory = factory.with_temp_dir(dir);
        }
        LoggerManager {
            env: self.env,
            factory,
            registry: Mutex::new(HashMap::new()),
        }
    }
}
