use crate::error::HandlerError;
use crate::formatter::StructuredFormatter;
use crate::record::LogRecord;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Destination for formatted records.
///
/// Handlers are called inline on the logging thread; each one formats the
/// record with the formatter it was built with and writes exactly one line.
pub trait LogHandler: Send + Sync {
    /// Format and write a single record.
    ///
    /// **Returns**
    /// - `Ok(())` once the line was handed to the underlying stream.
    /// - `Err(..)` on I/O failure. The logger reports it and carries on.
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError>;

    /// Flush buffered output. Default implementation is a no-op.
    fn flush(&self) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// In-memory console used to intercept output.
#[derive(Clone, Debug, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.bytes)).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        lock(&self.bytes).clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.bytes).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where a console handler writes.
#[derive(Clone, Debug, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
    Capture(CaptureBuffer),
}

/// Writes one JSON line per record to the console.
pub struct ConsoleHandler {
    formatter: Arc<StructuredFormatter>,
    target: ConsoleTarget,
}

impl ConsoleHandler {
    pub fn new(formatter: Arc<StructuredFormatter>, target: ConsoleTarget) -> Self {
        Self { formatter, target }
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let bytes = terminated(line);
        match &self.target {
            ConsoleTarget::Stdout => io::stdout().lock().write_all(&bytes),
            ConsoleTarget::Stderr => io::stderr().lock().write_all(&bytes),
            ConsoleTarget::Capture(buffer) => buffer.clone().write_all(&bytes),
        }
    }
}

impl LogHandler for ConsoleHandler {
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError> {
        let line = self.formatter.format(record);
        self.write_line(&line).map_err(HandlerError::Write)
    }

    fn flush(&self) -> Result<(), HandlerError> {
        let result = match &self.target {
            ConsoleTarget::Stdout => io::stdout().flush(),
            ConsoleTarget::Stderr => io::stderr().flush(),
            ConsoleTarget::Capture(_) => Ok(()),
        };
        result.map_err(HandlerError::Flush)
    }
}

/// Appends one JSON line per record to a file, flushing after every record
/// so short-lived processes do not lose output.
pub struct FileHandler {
    formatter: Arc<StructuredFormatter>,
    path: PathBuf,
    file: Mutex<File>,
}

impl FileHandler {
    /// Open (or create) `path` in append mode.
    pub fn open(formatter: Arc<StructuredFormatter>, path: impl Into<PathBuf>) -> Result<Self, HandlerError> {
        let path = path.into();
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| HandlerError::OpenFile {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            formatter,
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogHandler for FileHandler {
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError> {
        let line = self.formatter.format(record);
        let mut file = lock(&self.file);
        file.write_all(&terminated(&line)).map_err(HandlerError::Write)?;
        file.flush().map_err(HandlerError::Flush)
    }

    fn flush(&self) -> Result<(), HandlerError> {
        lock(&self.file).flush().map_err(HandlerError::Flush)
    }
}

// Line and newline go out in one write so handlers sharing a stream or an
// append-mode file never interleave within a line.
fn terminated(line: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(line.len() + 1);
    bytes.extend_from_slice(line.as_bytes());
    bytes.push(b'\n');
    bytes
}

// A panic while holding the lock leaves the data usable for appending
// lines, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
