//! Structured leveled logging.
//!
//! # Data Flow
//! ```text
//! root Logger (built once at startup, bound to a Sink)
//!     → with_fields / with_context / with_caller* (new snapshot each time)
//!     → info / infof / ... (one call to `output`)
//!     → record.rs (level, time, message, callers, fields)
//!     → sink.rs (one JSON line)
//!     → Fatal: exit(1) | Panic: unwind
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable values; deriving one never touches its parent
//! - Field maps are shared through `Arc` and copied only when extended
//! - The sink is the only shared mutable state
//! - No level filtering: every call that reaches `output` is written
//! - Records are best effort; serialization and write errors are dropped

mod caller;
mod context;
mod fields;
mod level;
mod record;
pub mod sink;

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

pub use caller::MAX_CALLER_DEPTH;
pub use context::Context;
pub use fields::{FieldValue, Fields};
pub use level::{Level, ParseLevelError};
pub use record::{Record, RESERVED_KEYS};
pub use sink::{MemorySink, Sink, WriterSink};

/// An immutable logging snapshot bound to a shared sink.
///
/// Cloning is cheap. Every `with_*` method returns a new snapshot and leaves
/// `self` as it was, so concurrent call sites can derive from the same root
/// without observing each other's context.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Sink>,
    ctx: Option<Context>,
    fields: Arc<Fields>,
    callers: Arc<[String]>,
}

impl Logger {
    /// Create a root logger writing to `sink`.
    pub fn new(sink: impl Sink + 'static) -> Self {
        Self::from_shared(Arc::new(sink))
    }

    /// Create a root logger over an already shared sink.
    pub fn from_shared(sink: Arc<dyn Sink>) -> Self {
        Self {
            sink,
            ctx: None,
            fields: Arc::new(Fields::new()),
            callers: Arc::from(Vec::new()),
        }
    }

    /// Snapshot with `extra` merged over the current fields.
    pub fn with_fields(&self, extra: Fields) -> Self {
        let mut derived = self.clone();
        if !extra.is_empty() {
            // The parent still holds a reference, so this copies the map.
            Arc::make_mut(&mut derived.fields).merge(&extra);
        }
        derived
    }

    /// Snapshot with a single extra field.
    pub fn with_field(&self, key: impl Into<String>, value: impl FieldValue + 'static) -> Self {
        self.with_fields(Fields::new().with(key, value))
    }

    /// Snapshot carrying `ctx` as its context handle.
    pub fn with_context(&self, ctx: Context) -> Self {
        Self {
            ctx: Some(ctx),
            ..self.clone()
        }
    }

    /// Snapshot whose caller list is the single frame `skip` levels above
    /// the function calling this method (`0` is that function itself).
    ///
    /// If the frame cannot be resolved the caller list is kept as is.
    ///
    /// Frames are counted on the unwound stack with inlined calls split back
    /// out, which needs at least line tables in the build. A function that
    /// returns the result of a call directly may be compiled as a tail call
    /// and then has no frame of its own to count.
    #[inline(never)]
    pub fn with_caller(&self, skip: usize) -> Self {
        match caller::capture(skip + 1, 1).pop() {
            Some(site) => self.with_callers(vec![site]),
            None => self.clone(),
        }
    }

    /// Snapshot whose caller list is the current call stack, starting at the
    /// function calling this method and moving outwards, truncated to
    /// [`MAX_CALLER_DEPTH`] frames.
    #[inline(never)]
    pub fn with_caller_frames(&self) -> Self {
        self.with_callers(caller::capture(1, MAX_CALLER_DEPTH))
    }

    fn with_callers(&self, callers: Vec<String>) -> Self {
        Self {
            callers: Arc::from(callers),
            ..self.clone()
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn context(&self) -> Option<&Context> {
        self.ctx.as_ref()
    }

    pub fn callers(&self) -> &[String] {
        &self.callers
    }

    /// Serialize this snapshot plus `message` into one JSON line.
    pub fn format_record(&self, level: Level, message: &str) -> serde_json::Result<Vec<u8>> {
        Record::new(level, message, &self.callers, &self.fields)?.to_line()
    }

    /// Write one record and apply the level's control-flow effect.
    ///
    /// The caller list of the record is the location of the code that called
    /// the public level method. Fatal and Panic flush the sink after writing
    /// and before exiting or unwinding; a sink that hands bytes off to another
    /// thread may still lose the record.
    ///
    /// The first record from a given call site walks and symbolizes the
    /// stack to name the enclosing function; later records from the same
    /// site reuse that name. The very first walk in a process also loads
    /// debug info and is much slower.
    #[track_caller]
    pub fn output(&self, level: Level, message: &str) {
        let located = self.with_callers(vec![caller::locate(Location::caller())]);
        if let Ok(line) = located.format_record(level, message) {
            let _ = self.sink.write_line(&line);
        }

        match level {
            Level::Debug | Level::Info | Level::Warn | Level::Error => {}
            Level::Fatal => {
                let _ = self.sink.flush();
                std::process::exit(1);
            }
            Level::Panic => {
                let _ = self.sink.flush();
                panic!("{}", message);
            }
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.output(Level::Debug, &message.to_string());
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Debug, &fmt::format(args));
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.output(Level::Info, &message.to_string());
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Info, &fmt::format(args));
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.output(Level::Warn, &message.to_string());
    }

    #[track_caller]
    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Warn, &fmt::format(args));
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.output(Level::Error, &message.to_string());
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Error, &fmt::format(args));
    }

    /// Write the record, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.output(Level::Fatal, &message.to_string());
    }

    #[track_caller]
    pub fn fatalf(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Fatal, &fmt::format(args));
    }

    /// Write the record, then panic with `message` as the payload.
    #[track_caller]
    pub fn panic(&self, message: impl fmt::Display) {
        self.output(Level::Panic, &message.to_string());
    }

    #[track_caller]
    pub fn panicf(&self, args: fmt::Arguments<'_>) {
        self.output(Level::Panic, &fmt::format(args));
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("ctx", &self.ctx)
            .field("fields", &self.fields)
            .field("callers", &self.callers)
            .finish_non_exhaustive()
    }
}

/// `debugf!(logger, "fmt", args...)` is `logger.debugf(format_args!(...))`.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(::std::format_args!($($arg)+))
    };
}

/// `infof!(logger, "fmt", args...)` is `logger.infof(format_args!(...))`.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! panicf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.panicf(::std::format_args!($($arg)+))
    };
}
