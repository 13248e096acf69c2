//! # Record Formatting Module
//!
//! Renders a [`LogEntry`] as either a human-readable text line or a
//! single-line JSON document. All value rendering goes through the
//! safe serializer, so formatting inherits its never-fail guarantee.

use crate::config::OutputFormat;
use crate::dispatch::LogEntry;
use crate::level::LogLevel;
use crate::serializer;
use chrono::SecondsFormat;

const ANSI_RESET: &str = "\x1b[0m";

/// Fixed level → ANSI color table.
fn level_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Debug => "\x1b[36m",  // cyan
        LogLevel::Info => "\x1b[32m",   // green
        LogLevel::Warn => "\x1b[33m",   // yellow
        LogLevel::Error => "\x1b[31m",  // red
        LogLevel::Silent => "\x1b[90m", // gray
    }
}

/// Uppercase level token, optionally wrapped in ANSI color codes.
pub fn format_level(level: LogLevel, colorize: bool) -> String {
    if colorize {
        format!("{}{}{}", level_color(level), level.as_upper_str(), ANSI_RESET)
    } else {
        level.as_upper_str().to_string()
    }
}

/// Render one record.
///
/// Text mode: `[<rfc3339>] LEVEL: <message>` followed by the
/// serialized metadata when present; the timestamp prefix honors the
/// `timestamp` toggle and the level token honors `colorize`.
///
/// JSON mode: one object per line with `timestamp`, `level`
/// (lowercase), `message`, `runtime`, and `metadata` — the metadata key
/// is omitted entirely when the record carries none.
pub fn format(entry: &LogEntry, format: OutputFormat, timestamp: bool, colorize: bool) -> String {
    match format {
        OutputFormat::Text => format_text(entry, timestamp, colorize),
        OutputFormat::Json => format_json(entry, timestamp),
    }
}

fn format_text(entry: &LogEntry, timestamp: bool, colorize: bool) -> String {
    let mut line = String::new();
    if timestamp {
        line.push('[');
        line.push_str(&entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true));
        line.push_str("] ");
    }
    line.push_str(&format_level(entry.level, colorize));
    line.push_str(": ");
    line.push_str(&entry.message);
    if let Some(metadata) = &entry.metadata {
        line.push(' ');
        line.push_str(&serializer::serialize_metadata(metadata, None));
    }
    line
}

fn format_json(entry: &LogEntry, timestamp: bool) -> String {
    let mut map = serde_json::Map::new();
    if timestamp {
        map.insert(
            "timestamp".to_string(),
            serde_json::Value::String(
                entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        );
    }
    map.insert(
        "level".to_string(),
        serde_json::Value::String(entry.level.as_str().to_string()),
    );
    map.insert(
        "message".to_string(),
        serde_json::Value::String(entry.message.clone()),
    );
    map.insert(
        "runtime".to_string(),
        serde_json::Value::String(entry.runtime.as_str().to_string()),
    );
    if let Some(metadata) = &entry.metadata {
        map.insert("metadata".to_string(), serializer::metadata_to_json(metadata));
    }
    serde_json::to_string(&serde_json::Value::Object(map))
        .unwrap_or_else(|_| "{\"level\":\"error\",\"message\":\"[Unserializable]\"}".to_string())
}
