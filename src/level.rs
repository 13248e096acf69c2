//! # Log Level Module
//!
//! This module defines the ordered severity scale used throughout the
//! logging facade. Levels form a total order so that threshold filtering
//! is a single integer comparison on the hot path.
//!
//! ## Filtering Rule
//!
//! A record at level `L` is emitted iff `L >= threshold`. `Silent` is a
//! threshold-only value used to disable output entirely; it is never a
//! meaningful level for an individual record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered log severity.
///
/// The derived `Ord` implementation follows declaration order, which is
/// what the dispatch engine relies on for threshold comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Detailed execution flow, parameter dumps, diagnostics
    Debug,
    /// Normal operation events
    Info,
    /// Recoverable issues and fallback actions
    Warn,
    /// Failures requiring attention
    Error,
    /// Threshold-only value that disables all output
    Silent,
}

impl LogLevel {
    /// All levels in ascending severity order.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Silent,
    ];

    /// Lowercase name, as used in JSON output and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Silent => "silent",
        }
    }

    /// Uppercase name, as used in text-format output.
    pub fn as_upper_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Silent => "SILENT",
        }
    }

    /// Parse a level name, falling back to `Info` for anything
    /// unrecognized. This is the lenient entry point used by the
    /// environment-variable configuration layer.
    pub fn from_str_or_default(s: &str) -> Self {
        s.parse().unwrap_or(LogLevel::Info)
    }

    /// Stable numeric representation used for atomic storage.
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Warn => 2,
            LogLevel::Error => 3,
            LogLevel::Silent => 4,
        }
    }

    /// Inverse of [`LogLevel::as_u8`]. Out-of-range input maps to the
    /// most conservative threshold rather than panicking.
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warn,
            3 => LogLevel::Error,
            _ => LogLevel::Silent,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name cannot be parsed.
///
/// Callers on the configuration path treat this as "use the default"
/// rather than propagating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized log level: {:?}", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "silent" | "off" => Ok(LogLevel::Silent),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

#[cfg(feature = "log-backend")]
impl LogLevel {
    /// Map to the `log` facade's record level. `Silent` has no record
    /// representation; records at `Silent` are never emitted upstream
    /// of this conversion.
    pub fn to_backend_level(self) -> Option<log::Level> {
        match self {
            LogLevel::Debug => Some(log::Level::Debug),
            LogLevel::Info => Some(log::Level::Info),
            LogLevel::Warn => Some(log::Level::Warn),
            LogLevel::Error => Some(log::Level::Error),
            LogLevel::Silent => None,
        }
    }

    /// Map to the `log` facade's threshold filter.
    pub fn to_backend_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Silent => log::LevelFilter::Off,
        }
    }
}
