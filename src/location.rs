//! Resolution of the application source location for a record.
//!
//! Rust has no runtime frame introspection, so the frames are captured where
//! the log call is written: `#[track_caller]` on the logger methods, the
//! crate's macros (module path and enclosing function name), or the callsite
//! and enclosing spans of a `tracing` event. The extractor then walks that
//! chain innermost first and skips everything that belongs to the logging
//! library, the same way a stack walk would skip the library's own frames.

use crate::record::LogRecord;
use serde::Serialize;
use std::borrow::Cow;
use std::panic::Location;
use std::path::Path;

/// Upper bound on the number of frames inspected for one record.
pub const MAX_FRAMES: usize = 20;

/// Placeholder for an unresolvable module or function.
pub const UNKNOWN: &str = "unknown";

/// One captured call frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub module: Option<&'static str>,
    pub file: Option<&'static str>,
    pub function: Option<&'static str>,
    pub line: Option<u32>,
}

impl Frame {
    pub const fn new(
        module: &'static str,
        file: &'static str,
        function: &'static str,
        line: u32,
    ) -> Self {
        Self {
            module: Some(module),
            file: Some(file),
            function: Some(function),
            line: Some(line),
        }
    }

    /// Frame of whoever called the current `#[track_caller]` function.
    ///
    /// Only file and line are known; module and function stay unresolved.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            module: None,
            file: Some(location.file()),
            function: None,
            line: Some(location.line()),
        }
    }

    /// Frame describing a `tracing` callsite (event or span).
    pub fn from_metadata(meta: &'static tracing::Metadata<'static>) -> Self {
        Self {
            module: meta.module_path(),
            file: meta.file(),
            function: None,
            line: meta.line(),
        }
    }

    pub fn with_function(mut self, function: &'static str) -> Self {
        self.function = Some(function);
        self
    }
}

/// Resolved caller location of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub module: String,
    pub filename: String,
    pub function_name: String,
    pub line: u32,
}

impl SourceLocation {
    fn from_frame(frame: &Frame) -> Self {
        let cwd = std::env::current_dir().ok();
        Self {
            module: frame.module.unwrap_or(UNKNOWN).to_string(),
            filename: frame
                .file
                .map(|file| relative_filename(file, cwd.as_deref()))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            function_name: frame.function.unwrap_or(UNKNOWN).to_string(),
            line: frame.line.unwrap_or(0),
        }
    }

    /// Location built from what the record itself captured.
    fn fallback(record: &LogRecord) -> Self {
        let origin = record.origin();
        Self {
            module: record.logger.clone(),
            filename: origin
                .and_then(|frame| frame.file)
                .map(bare_filename)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            function_name: UNKNOWN.to_string(),
            line: origin.and_then(|frame| frame.line).unwrap_or(0),
        }
    }
}

/// Decides which frames belong to the logging library.
///
/// By default that is this crate, recognized by module path, or by source
/// directory for frames that carry no module. Embedders can add their own logging facades so that
/// records point past them to the code that called the facade.
#[derive(Debug, Clone)]
pub struct LibraryBoundary {
    modules: Vec<Cow<'static, str>>,
    paths: Vec<Cow<'static, str>>,
}

impl Default for LibraryBoundary {
    fn default() -> Self {
        Self {
            modules: vec![Cow::Borrowed(library_module_root())],
            paths: library_source_dir().map(Cow::Borrowed).into_iter().collect(),
        }
    }
}

impl LibraryBoundary {
    /// A boundary that claims no frames at all.
    pub fn empty() -> Self {
        Self {
            modules: Vec::new(),
            paths: Vec::new(),
        }
    }

    /// Also treat `module` and its submodules as library code.
    pub fn with_module(mut self, module: impl Into<Cow<'static, str>>) -> Self {
        self.modules.push(module.into());
        self
    }

    /// Also treat files under `path` as library code, for frames captured
    /// without a module path.
    pub fn with_path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn contains(&self, frame: &Frame) -> bool {
        let by_module = frame.module.is_some_and(|module| {
            self.modules.iter().any(|root| {
                let root: &str = root;
                module == root
                    || module
                        .strip_prefix(root)
                        .is_some_and(|rest| rest.starts_with("::"))
            })
        });
        if frame.module.is_some() {
            return by_module;
        }
        frame.file.is_some_and(|file| {
            let file = Path::new(file);
            self.paths.iter().any(|dir| file.starts_with(&**dir))
        })
    }
}

/// Find the first application frame of `record`, or fall back to the
/// record's own origin.
///
/// Frames without a file cannot be resolved and are passed over like library
/// frames. Never fails and never returns a partially resolved location.
pub fn extract(record: &LogRecord, boundary: &LibraryBoundary) -> SourceLocation {
    record
        .frames
        .iter()
        .take(MAX_FRAMES)
        .find(|frame| frame.file.is_some() && !boundary.contains(frame))
        .map(SourceLocation::from_frame)
        .unwrap_or_else(|| SourceLocation::fallback(record))
}

/// Path relative to `cwd` when under it; relative paths are kept as they
/// are; anything else is reduced to its file name.
pub fn relative_filename(file: &str, cwd: Option<&Path>) -> String {
    let path = Path::new(file);
    if path.is_relative() {
        return normalize_separators(file);
    }
    match cwd.and_then(|cwd| path.strip_prefix(cwd).ok()) {
        Some(rel) if !rel.as_os_str().is_empty() => normalize_separators(&rel.to_string_lossy()),
        _ => bare_filename(file),
    }
}

fn bare_filename(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Reduce the type name of a function-local item to the enclosing function.
///
/// `my_app::orders::place::__here` becomes `place`; closure and async
/// segments are skipped so the named function is reported.
#[doc(hidden)]
pub fn trim_function_path(type_name: &'static str) -> &'static str {
    let mut path = type_name.strip_suffix("::__here").unwrap_or(type_name);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}

fn library_module_root() -> &'static str {
    let path = module_path!();
    path.split("::").next().unwrap_or(path)
}

fn library_source_dir() -> Option<&'static str> {
    Path::new(file!()).parent().and_then(|dir| dir.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Level;
    use std::path::PathBuf;

    const APP: Frame = Frame::new("shop::orders", "tests/orders.rs", "place_order", 42);

    fn lib_frame(line: u32) -> Frame {
        Frame::new("tracing_json_log::logger", "src/logger.rs", "log", line)
    }

    fn record_with(frames: Vec<Frame>) -> LogRecord {
        let mut record = LogRecord::new("shop", Level::Info, "hi");
        record.frames = frames;
        record
    }

    #[test]
    fn first_application_frame_wins() {
        let record = record_with(vec![lib_frame(10), lib_frame(20), APP]);
        let loc = extract(&record, &LibraryBoundary::default());
        assert_eq!(loc.module, "shop::orders");
        assert_eq!(loc.filename, "tests/orders.rs");
        assert_eq!(loc.function_name, "place_order");
        assert_eq!(loc.line, 42);
    }

    #[test]
    fn boundary_recognizes_module_and_path() {
        let boundary = LibraryBoundary::default();
        assert!(boundary.contains(&lib_frame(1)));
        assert!(boundary.contains(&Frame {
            module: None,
            file: Some(file!()),
            function: None,
            line: Some(1),
        }));
        assert!(!boundary.contains(&APP));
        // prefix match is per path segment
        assert!(!boundary.contains(&Frame::new(
            "tracing_json_log_extras::x",
            "other/x.rs",
            "f",
            1
        )));
    }

    #[test]
    fn extra_facade_modules_are_skipped() {
        let facade = Frame::new("shop::telemetry", "tests/telemetry.rs", "log_event", 7);
        let record = record_with(vec![facade, APP]);

        let plain = extract(&record, &LibraryBoundary::default());
        assert_eq!(plain.function_name, "log_event");

        let boundary = LibraryBoundary::default().with_module("shop::telemetry");
        let resolved = extract(&record, &boundary);
        assert_eq!(resolved.function_name, "place_order");
    }

    #[test]
    fn walk_is_bounded() {
        let mut frames = vec![lib_frame(1); MAX_FRAMES];
        frames.push(APP);
        let loc = extract(&record_with(frames), &LibraryBoundary::default());
        // the application frame sits past the limit, so the record's own
        // origin is used
        assert_eq!(loc.module, "shop");
        assert_eq!(loc.function_name, UNKNOWN);
        assert_eq!(loc.filename, "logger.rs");
        assert_eq!(loc.line, 1);

        let mut frames = vec![lib_frame(1); MAX_FRAMES - 1];
        frames.push(APP);
        let loc = extract(&record_with(frames), &LibraryBoundary::default());
        assert_eq!(loc.function_name, "place_order");
    }

    #[test]
    fn no_frames_falls_back_fully() {
        let loc = extract(&record_with(Vec::new()), &LibraryBoundary::default());
        assert_eq!(
            loc,
            SourceLocation {
                module: "shop".into(),
                filename: UNKNOWN.into(),
                function_name: UNKNOWN.into(),
                line: 0,
            }
        );
    }

    #[test]
    fn caller_frame_has_defaults_for_module_and_function() {
        let frame = Frame::caller();
        let record = record_with(vec![frame]);
        let loc = extract(&record, &LibraryBoundary::empty());
        assert_eq!(loc.module, UNKNOWN);
        assert_eq!(loc.function_name, UNKNOWN);
        assert!(loc.filename.ends_with("location.rs"));
        assert!(loc.line > 0);
    }

    #[test]
    fn filenames_relative_to_cwd() {
        let cwd = PathBuf::from("/srv/app");
        assert_eq!(
            relative_filename("/srv/app/src/jobs/run.rs", Some(&cwd)),
            "src/jobs/run.rs"
        );
        assert_eq!(relative_filename("/opt/other/lib.rs", Some(&cwd)), "lib.rs");
        assert_eq!(relative_filename("/opt/other/lib.rs", None), "lib.rs");
        assert_eq!(relative_filename("src/main.rs", Some(&cwd)), "src/main.rs");
    }

    #[test]
    fn function_paths_are_trimmed() {
        assert_eq!(trim_function_path("shop::orders::place::__here"), "place");
        assert_eq!(
            trim_function_path("shop::orders::place::{{closure}}::{{closure}}::__here"),
            "place"
        );
        assert_eq!(trim_function_path("main::__here"), "main");
    }
}
