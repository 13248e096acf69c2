//! # Configuration Management Module
//!
//! This module models logger configuration as two layers: a
//! fully-populated [`LoggerConfig`] that sinks consume, and an
//! all-optional [`PartialConfig`] overlay that each configuration
//! source produces. Sources merge lowest to highest priority:
//!
//! 1. Built-in defaults (colorize seeded from the detected runtime)
//! 2. Optional `logger.toml` in the platform config directory
//! 3. Process environment variables
//! 4. Caller-supplied overlay
//!
//! ## Merge Law
//!
//! Every field merges by shallow override except `metadata`, which
//! merges per key (later sources win per key), and `transports`, which
//! is wholesale-replaced by the most specific non-empty source. A
//! merged config always has every field populated; no partial config
//! ever reaches a sink constructor.
//!
//! ## Fail-Safe Loading
//!
//! File and environment layers never fail the caller: a missing,
//! unreadable, or corrupt config file and unrecognized variable values
//! all degrade to "contribute nothing", so the logger always starts.

use crate::level::LogLevel;
use crate::value::Metadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the minimum level.
pub const ENV_LEVEL: &str = "OMNILOG_LEVEL";
/// Environment variable naming the output format (`text` | `json`).
pub const ENV_FORMAT: &str = "OMNILOG_FORMAT";
/// Environment variable toggling the timestamp prefix.
pub const ENV_TIMESTAMP: &str = "OMNILOG_TIMESTAMP";
/// Environment variable toggling color output.
pub const ENV_COLOR: &str = "OMNILOG_COLOR";

/// Rendering mode for emitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented human-readable output
    Text,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    /// Lenient parse used by the environment layer: unrecognized input
    /// contributes nothing so the base default applies.
    pub fn parse_opt(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Declarative transport destination.
///
/// Only the console transport is executed by this crate; file and http
/// destinations are declarations handed to the optional backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Console,
    File,
    Http,
    Custom,
}

/// A single declared transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Destination type
    #[serde(rename = "type")]
    pub kind: TransportKind,
    /// Per-transport level override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    /// Free-form transport options (path, url, headers, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl TransportConfig {
    /// The default console transport.
    pub fn console() -> Self {
        TransportConfig {
            kind: TransportKind::Console,
            level: None,
            options: BTreeMap::new(),
        }
    }
}

/// Fully-resolved logger configuration.
///
/// Invariant: every field is populated. Construction goes through
/// [`LoggerConfig::defaults`] plus [`LoggerConfig::apply`]; sinks never
/// see a partially-merged value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Minimum level a logger built from this config will emit
    pub level: LogLevel,
    /// Record rendering mode
    pub format: OutputFormat,
    /// Whether text output carries the timestamp prefix
    pub timestamp: bool,
    /// Whether the level token is color-styled
    pub colorize: bool,
    /// Base metadata attached to every record
    #[serde(default)]
    pub metadata: Metadata,
    /// Declared transports
    #[serde(default)]
    pub transports: Vec<TransportConfig>,
}

impl LoggerConfig {
    /// Built-in defaults. `colorize` is seeded from the detected
    /// runtime's color capability by the factory.
    pub fn defaults(colorize: bool) -> Self {
        LoggerConfig {
            level: LogLevel::Info,
            format: OutputFormat::Text,
            timestamp: true,
            colorize,
            metadata: Metadata::new(),
            transports: vec![TransportConfig::console()],
        }
    }

    /// Merge an overlay into this config, applying the merge law
    /// documented at module level.
    pub fn apply(&mut self, overlay: &PartialConfig) {
        if let Some(level) = overlay.level {
            self.level = level;
        }
        if let Some(format) = overlay.format {
            self.format = format;
        }
        if let Some(timestamp) = overlay.timestamp {
            self.timestamp = timestamp;
        }
        if let Some(colorize) = overlay.colorize {
            self.colorize = colorize;
        }
        for (key, value) in &overlay.metadata {
            self.metadata.insert(key.clone(), value.clone());
        }
        if !overlay.transports.is_empty() {
            self.transports = overlay.transports.clone();
        }
    }

    /// Resolve the default layering: defaults ← file ← env ← `user`.
    pub fn resolve(colorize_default: bool, user: &PartialConfig) -> Self {
        let mut config = LoggerConfig::defaults(colorize_default);
        config.apply(&PartialConfig::load());
        config.apply(&PartialConfig::from_env());
        config.apply(user);
        config
    }

    /// Persist this config as pretty-printed TOML.
    ///
    /// Unlike the logging path, explicit persistence reports its errors
    /// so the caller can surface them.
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// One configuration source's contribution. Every field optional;
/// `Default` is the empty overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConfig {
    pub level: Option<LogLevel>,
    pub format: Option<OutputFormat>,
    pub timestamp: Option<bool>,
    pub colorize: Option<bool>,
    pub metadata: Metadata,
    pub transports: Vec<TransportConfig>,
}

impl PartialConfig {
    /// Overlay setting only the level. Convenience for the common
    /// "just give me warnings" call shape.
    pub fn with_level(level: LogLevel) -> Self {
        PartialConfig {
            level: Some(level),
            ..PartialConfig::default()
        }
    }

    /// Read the environment layer.
    ///
    /// Unrecognized values contribute nothing: an invalid level string
    /// leaves the default (`info`) in force, an invalid format leaves
    /// the format unset.
    pub fn from_env() -> Self {
        PartialConfig {
            level: env_value(ENV_LEVEL).and_then(|s| LogLevel::from_str(&s).ok()),
            format: env_value(ENV_FORMAT).and_then(|s| OutputFormat::parse_opt(&s)),
            timestamp: env_value(ENV_TIMESTAMP).and_then(|s| parse_toggle(&s)),
            colorize: env_value(ENV_COLOR).and_then(|s| parse_toggle(&s)),
            metadata: Metadata::new(),
            transports: Vec::new(),
        }
    }

    /// Parse a TOML document into an overlay.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse a TOML file into an overlay.
    pub fn from_toml_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Load the optional per-user config file, falling back to the
    /// empty overlay on any failure. The logger must always start, so
    /// failures are reported on stderr and otherwise ignored.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::from_toml_path(&path) {
                Ok(overlay) => overlay,
                Err(e) => {
                    eprintln!("omnilog: failed to read {}: {}", path.display(), e);
                    PartialConfig::default()
                }
            },
            _ => PartialConfig::default(),
        }
    }

    /// Platform-appropriate location of the optional config file:
    /// `<config_dir>/omnilog/logger.toml`.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("omnilog").join("logger.toml"))
    }
}

fn env_value(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Boolean toggles accept the usual spellings; anything else
/// contributes nothing.
fn parse_toggle(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
