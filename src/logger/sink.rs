//! Destinations for formatted records.
//!
//! # Design Decisions
//! - One `write_line` call per record; the sink appends the newline
//! - Sinks serialize concurrent writes themselves, the logger takes no lock
//! - Rotation and retention belong to the writer behind the sink

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};

/// Anything that accepts newline-delimited log records.
pub trait Sink: Send + Sync {
    /// Write one record. `line` carries no trailing newline.
    fn write_line(&self, line: &[u8]) -> io::Result<()>;

    /// Push buffered bytes to the destination.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Adapts any [`Write`] into a [`Sink`] by holding it behind a mutex.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> MutexGuard<'_, W> {
        // A panic mid-write leaves at worst a torn line; keep logging.
        self.writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut writer = self.lock();
        writer.write_all(line)?;
        writer.write_all(b"\n")
    }

    fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }
}

/// Rolling file sink: `<dir>/<prefix>.<date>.<suffix>`, rotated daily,
/// keeping at most `max_files` files.
pub fn rolling_file(
    dir: impl AsRef<Path>,
    prefix: &str,
    suffix: &str,
    max_files: usize,
) -> Result<WriterSink<RollingFileAppender>, InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix(suffix.trim_start_matches('.'))
        .max_log_files(max_files.max(1))
        .build(dir)?;
    Ok(WriterSink::new(appender))
}

/// In-memory sink, mainly for tests. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buffer().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.buffer())
            .lines()
            .map(str::to_owned)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Sink for MemorySink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        let mut buffer = self.buffer();
        buffer.extend_from_slice(line);
        buffer.push(b'\n');
        Ok(())
    }
}
