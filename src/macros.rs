//! Logging macros.
//!
//! Unlike the `Logger` methods, the macros also capture the calling module
//! and the enclosing function name, and skip formatting entirely when the
//! level is disabled.
//!
//! ```ignore
//! let logger = tracing_json_log::get_logger!();
//! tracing_json_log::info!(logger, "user {} signed in", name);
//! tracing_json_log::warning!(logger, { "user_id": 7, "plan": "pro" }, "quota at {}%", pct);
//! ```

/// Log at an explicit level.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, { $($key:literal : $value:expr),* $(,)? }, $($arg:tt)+) => {{
        let __logger: &$crate::Logger = &$logger;
        let __level: $crate::Level = $level;
        if __logger.is_enabled_for(__level) {
            #[allow(unused_mut)]
            let mut __fields = $crate::Fields::new();
            $( __fields.insert($key, &$value); )*
            __logger.log_at($crate::__frame!(), __level, ::std::format_args!($($arg)+), __fields);
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $crate::log!($logger, $level, {}, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Info, $($rest)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Warning, $($rest)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Error, $($rest)+)
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::Critical, $($rest)+)
    };
}

/// Logger for the calling module, or for `name` when given.
///
/// Without a name, resolution goes `APP_NAME`, then the calling module
/// path (unless it is a binary's `main.rs`), then the default.
#[macro_export]
macro_rules! get_logger {
    () => {
        $crate::LoggerManager::global().get_or_create_logger_from(
            ::std::option::Option::None,
            ::std::option::Option::Some($crate::CallerModule {
                module: ::std::module_path!(),
                file: ::std::file!(),
            }),
        )
    };
    ($name:expr) => {
        $crate::get_logger(::std::option::Option::Some($name))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __frame {
    () => {
        $crate::Frame::new(
            ::std::module_path!(),
            ::std::file!(),
            $crate::__function_name!(),
            ::std::line!(),
        )
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::location::trim_function_path(__type_name_of(__here))
    }};
}
