//! # Console Sink Module
//!
//! Writes formatted records to the host's console-like channels:
//! debug/info to standard output, warn/error to standard error. When a
//! channel write fails, the sink falls back progressively to the other
//! channel and finally to a silent no-op — a logging call can never
//! surface an io error to the caller.
//!
//! Writers are injectable so tests (and embedding hosts without real
//! standard streams) can capture output.

use crate::config::{LoggerConfig, OutputFormat};
use crate::dispatch::{LogEntry, LogSink};
use crate::format;
use crate::level::LogLevel;
use std::io::Write;
use std::sync::Mutex;

struct Channels {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

/// Sink that renders records per the merged config and routes them to
/// leveled console channels.
pub struct ConsoleSink {
    config: LoggerConfig,
    channels: Mutex<Channels>,
}

impl ConsoleSink {
    /// Console sink over the process standard streams.
    pub fn new(config: LoggerConfig) -> Self {
        ConsoleSink::with_writers(
            config,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Console sink over caller-supplied channels.
    pub fn with_writers(
        config: LoggerConfig,
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
    ) -> Self {
        ConsoleSink {
            config,
            channels: Mutex::new(Channels { out, err }),
        }
    }

    fn render(&self, entry: &LogEntry) -> String {
        format::format(
            entry,
            self.config.format,
            self.config.timestamp,
            self.config.colorize && self.config.format == OutputFormat::Text,
        )
    }
}

impl LogSink for ConsoleSink {
    fn write(&self, entry: &LogEntry) {
        let line = self.render(entry);
        // Poisoned channel state degrades to a silent no-op.
        let Ok(mut channels) = self.channels.lock() else {
            return;
        };
        let channels = &mut *channels;
        let error_channel = matches!(entry.level, LogLevel::Warn | LogLevel::Error);
        let (primary, fallback) = if error_channel {
            (&mut channels.err, &mut channels.out)
        } else {
            (&mut channels.out, &mut channels.err)
        };
        if writeln!(primary, "{}", line).is_err() {
            // Most-general-channel fallback; if this fails too, the
            // record is dropped and the call still returns normally.
            let _ = writeln!(fallback, "{}", line);
        }
    }
}
