//! # Dispatch Engine Module
//!
//! The engine behind every logger: threshold filtering, lazy message
//! resolution, metadata inheritance, record construction, and the
//! handoff to a sink. Concrete output behavior lives behind the
//! [`LogSink`] trait so the engine itself stays sink-agnostic — the
//! console and backend adapters are just sinks composed into the same
//! [`Logger`].
//!
//! ## Performance Contract
//!
//! A filtered-out call returns after a single atomic load and integer
//! comparison: no message resolution, no metadata merge, no
//! allocation. Lazy messages ([`LogMessage::lazy`]) make this contract
//! reach into the caller's format cost as well — the closure runs only
//! when the record will actually be emitted, and then exactly once.
//!
//! ## Failure Contract
//!
//! No operation here propagates a failure to the caller. Message
//! resolution, merging, and sink writes run inside a panic guard; a
//! misbehaving closure or sink degrades to a dropped record, never to
//! a crash of the calling code.

use crate::config::LoggerConfig;
use crate::level::LogLevel;
use crate::runtime::{RuntimeKind, RuntimeProfile};
use crate::value::Metadata;
use chrono::{DateTime, Utc};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// A log message: either ready text or a deferred producer.
pub enum LogMessage {
    /// Already-built message text
    Text(String),
    /// Deferred producer, invoked only for emitted records
    Lazy(Box<dyn FnOnce() -> String + Send>),
}

impl LogMessage {
    /// Defer message construction until the record is known to be
    /// emitted.
    pub fn lazy<F>(f: F) -> Self
    where
        F: FnOnce() -> String + Send + 'static,
    {
        LogMessage::Lazy(Box::new(f))
    }

    /// Resolve to text. This is the only point where a lazy producer
    /// runs.
    fn resolve(self) -> String {
        match self {
            LogMessage::Text(text) => text,
            LogMessage::Lazy(produce) => produce(),
        }
    }
}

impl From<&str> for LogMessage {
    fn from(s: &str) -> Self {
        LogMessage::Text(s.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(s: String) -> Self {
        LogMessage::Text(s)
    }
}

impl std::fmt::Debug for LogMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogMessage::Text(text) => write!(f, "Text({:?})", text),
            LogMessage::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// One structured log record.
///
/// Built per emitted call, consumed immediately by the sink, never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Capture instant
    pub timestamp: DateTime<Utc>,
    /// Record severity (never `Silent`)
    pub level: LogLevel,
    /// Resolved message text
    pub message: String,
    /// Merged metadata; `None` when the merge produced nothing
    pub metadata: Option<Metadata>,
    /// Identity of the runtime the record was produced on
    pub runtime: RuntimeKind,
}

/// Output seam implemented by the concrete adapters.
///
/// Implementations must be infallible from the caller's point of view:
/// internal write errors are handled by fallback, never surfaced.
pub trait LogSink: Send + Sync {
    /// Emit one record.
    fn write(&self, entry: &LogEntry);

    /// Threshold propagation hook. Sinks that front an external
    /// backend keep its minimum level in sync here; everything else
    /// ignores it.
    fn set_min_level(&self, _level: LogLevel) {}
}

/// A logger instance: mutable threshold plus immutable configuration,
/// runtime profile, inherited metadata, and a shared sink handle.
pub struct Logger {
    level: AtomicU8,
    config: LoggerConfig,
    runtime: RuntimeProfile,
    child_metadata: Metadata,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Build a logger over a sink. The instance's starting threshold
    /// and base metadata come from the merged config.
    pub fn new(config: LoggerConfig, runtime: RuntimeProfile, sink: Arc<dyn LogSink>) -> Self {
        let child_metadata = config.metadata.clone();
        Logger {
            level: AtomicU8::new(config.level.as_u8()),
            config,
            runtime,
            child_metadata,
            sink,
        }
    }

    /// Core dispatch. Filtered calls return immediately; emitted calls
    /// resolve the message, merge metadata (instance first, call-site
    /// wins per key), build the record, and hand it to the sink.
    pub fn log(&self, level: LogLevel, message: impl Into<LogMessage>, metadata: Option<Metadata>) {
        if level == LogLevel::Silent {
            // Silent is a threshold, not a record level.
            debug_assert!(false, "log() called with LogLevel::Silent");
            return;
        }
        if level.as_u8() < self.level.load(Ordering::Relaxed) {
            return;
        }

        let message = message.into();
        // Nothing past this point may take down the caller.
        let _ = std::panic::catch_unwind(AssertUnwindSafe(move || {
            let entry = LogEntry {
                timestamp: Utc::now(),
                level,
                message: message.resolve(),
                metadata: self.merged_metadata(metadata),
                runtime: self.runtime.kind,
            };
            self.sink.write(&entry);
        }));
    }

    /// Log at debug level.
    pub fn debug(&self, message: impl Into<LogMessage>, metadata: Option<Metadata>) {
        self.log(LogLevel::Debug, message, metadata);
    }

    /// Log at info level.
    pub fn info(&self, message: impl Into<LogMessage>, metadata: Option<Metadata>) {
        self.log(LogLevel::Info, message, metadata);
    }

    /// Log at warn level.
    pub fn warn(&self, message: impl Into<LogMessage>, metadata: Option<Metadata>) {
        self.log(LogLevel::Warn, message, metadata);
    }

    /// Log at error level.
    pub fn error(&self, message: impl Into<LogMessage>, metadata: Option<Metadata>) {
        self.log(LogLevel::Error, message, metadata);
    }

    /// Current threshold.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Change the threshold, propagating it to the sink so an attached
    /// backend stays in sync.
    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
        self.sink.set_min_level(level);
    }

    /// Builder-style threshold override.
    pub fn with_level(self, level: LogLevel) -> Self {
        self.set_level(level);
        self
    }

    /// Spawn a child logger carrying additional inherited metadata.
    ///
    /// The child copies the parent's resolved level and config and owns
    /// its own metadata map; only the sink handle is shared. Changing
    /// either instance's level afterwards does not affect the other.
    pub fn child(&self, metadata: Metadata) -> Logger {
        let mut child_metadata = self.child_metadata.clone();
        child_metadata.extend(metadata);
        Logger {
            level: AtomicU8::new(self.level.load(Ordering::Relaxed)),
            config: self.config.clone(),
            runtime: self.runtime.clone(),
            child_metadata,
            sink: Arc::clone(&self.sink),
        }
    }

    /// The merged configuration this logger was built from.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// The runtime profile detected at construction.
    pub fn runtime(&self) -> &RuntimeProfile {
        &self.runtime
    }

    fn merged_metadata(&self, call_site: Option<Metadata>) -> Option<Metadata> {
        match call_site {
            None if self.child_metadata.is_empty() => None,
            None => Some(self.child_metadata.clone()),
            Some(call_site) => {
                let mut merged = self.child_metadata.clone();
                merged.extend(call_site);
                if merged.is_empty() {
                    None
                } else {
                    Some(merged)
                }
            }
        }
    }
}

impl Clone for Logger {
    fn clone(&self) -> Self {
        Logger {
            level: AtomicU8::new(self.level.load(Ordering::Relaxed)),
            config: self.config.clone(),
            runtime: self.runtime.clone(),
            child_metadata: self.child_metadata.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("runtime", &self.runtime.kind)
            .field("child_metadata_keys", &self.child_metadata.len())
            .finish()
    }
}

/// Log a formatted debug message; interpolation is deferred until the
/// call is known to be emitted.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug($crate::dispatch::LogMessage::lazy(move || format!($($arg)*)), None)
    };
}

/// Log a formatted info message; interpolation is deferred.
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info($crate::dispatch::LogMessage::lazy(move || format!($($arg)*)), None)
    };
}

/// Log a formatted warning; interpolation is deferred.
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn($crate::dispatch::LogMessage::lazy(move || format!($($arg)*)), None)
    };
}

/// Log a formatted error; interpolation is deferred.
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error($crate::dispatch::LogMessage::lazy(move || format!($($arg)*)), None)
    };
}
