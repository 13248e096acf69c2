//! # Logger Factory Module
//!
//! Entry points that wire everything together: detect the runtime
//! profile, resolve the configuration layers, choose the sink the
//! profile can support, and hand back a ready [`Logger`].
//!
//! ## Adapter Selection
//!
//! The mapping from profile to sink is total: file-system-capable
//! runtimes (server, edge-like) get the backend-integrated sink, and
//! every other profile — browser, worker, and explicitly unknown —
//! gets the console sink, the safest always-available path.

use crate::backend::BackendSink;
use crate::config::{LoggerConfig, OutputFormat, PartialConfig};
use crate::console::ConsoleSink;
use crate::dispatch::{LogSink, Logger};
use crate::level::LogLevel;
use crate::runtime::{self, RuntimeProfile};
use std::sync::Arc;

/// Environment-identity variables consulted by
/// [`create_for_environment`], in priority order; the first non-empty
/// value wins.
pub const ENV_IDENTITY_VARS: [&str; 5] =
    ["OMNILOG_ENV", "APP_ENV", "NODE_ENV", "ENVIRONMENT", "ENV"];

/// Identity assumed when none of the variables is set.
const DEFAULT_IDENTITY: &str = "development";

/// Build a logger for the detected runtime, merging the given overlay
/// over the default configuration layers.
pub fn create(user: &PartialConfig) -> Logger {
    create_with_profile(runtime::detect(), user)
}

/// Build a logger with an all-default overlay.
pub fn create_default() -> Logger {
    create(&PartialConfig::default())
}

/// Build a logger for an explicit profile. `create` detects and
/// delegates here; tests and embedders with out-of-band knowledge of
/// their host call this directly.
pub fn create_with_profile(profile: RuntimeProfile, user: &PartialConfig) -> Logger {
    let config = LoggerConfig::resolve(profile.capabilities.color_support, user);
    let sink: Arc<dyn LogSink> = if profile.capabilities.file_system {
        Arc::new(BackendSink::new(config.clone()))
    } else {
        Arc::new(ConsoleSink::new(config.clone()))
    };
    Logger::new(config, profile, sink)
}

/// Build a logger whose defaults derive from the deployment
/// environment's identity.
///
/// Production favors machine-readable strictness (error threshold,
/// JSON, no color); development favors verbosity; staging and test sit
/// in between. Unrecognized identities get an info threshold.
pub fn create_for_environment() -> Logger {
    let identity = environment_identity();
    create(&environment_overlay(&identity))
}

/// First non-empty identity variable, defaulting to `development`.
fn environment_identity() -> String {
    for var in ENV_IDENTITY_VARS {
        if let Ok(value) = std::env::var(var) {
            let value = value.trim().to_string();
            if !value.is_empty() {
                return value;
            }
        }
    }
    DEFAULT_IDENTITY.to_string()
}

/// Fixed identity → configuration mapping.
fn environment_overlay(identity: &str) -> PartialConfig {
    let identity = identity.trim().to_ascii_lowercase();
    let (level, format, colorize) = match identity.as_str() {
        "production" => (LogLevel::Error, OutputFormat::Json, false),
        "staging" | "test" => (LogLevel::Warn, OutputFormat::Text, true),
        "development" | "dev" => (LogLevel::Debug, OutputFormat::Text, true),
        _ => (LogLevel::Info, OutputFormat::Text, true),
    };
    PartialConfig {
        level: Some(level),
        format: Some(format),
        colorize: Some(colorize),
        ..PartialConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{HostSignals, RuntimeKind};

    fn profile_of(kind: RuntimeKind) -> RuntimeProfile {
        let signals = match kind {
            RuntimeKind::Server => HostSignals {
                node_version: Some("20".to_string()),
                ..HostSignals::default()
            },
            RuntimeKind::EdgeLike => HostSignals {
                deno_version: Some("1.44".to_string()),
                ..HostSignals::default()
            },
            RuntimeKind::Browser => HostSignals {
                has_window: true,
                has_document: true,
                ..HostSignals::default()
            },
            RuntimeKind::Worker => HostSignals {
                has_import_scripts: true,
                ..HostSignals::default()
            },
            RuntimeKind::Unknown => HostSignals::default(),
        };
        RuntimeProfile::from_signals(&signals)
    }

    #[test]
    fn test_every_profile_builds_a_logger() {
        // The profile → sink mapping is total; construction must work
        // for every runtime identity.
        for kind in [
            RuntimeKind::Server,
            RuntimeKind::EdgeLike,
            RuntimeKind::Browser,
            RuntimeKind::Worker,
            RuntimeKind::Unknown,
        ] {
            let logger = create_with_profile(profile_of(kind), &PartialConfig::default());
            assert_eq!(logger.runtime().kind, kind);
        }
    }

    #[test]
    fn test_user_overlay_wins() {
        let logger = create_with_profile(
            profile_of(RuntimeKind::Server),
            &PartialConfig {
                level: Some(LogLevel::Error),
                format: Some(OutputFormat::Json),
                ..PartialConfig::default()
            },
        );
        assert_eq!(logger.level(), LogLevel::Error);
        assert_eq!(logger.config().format, OutputFormat::Json);
    }

    #[test]
    fn test_colorize_defaults_to_capability() {
        let browser = create_with_profile(
            profile_of(RuntimeKind::Browser),
            &PartialConfig::default(),
        );
        let worker = create_with_profile(
            profile_of(RuntimeKind::Worker),
            &PartialConfig::default(),
        );
        // Browser supports color, worker does not. Environment layers
        // may override this on machines with OMNILOG_COLOR set, so only
        // assert when the variable is absent.
        if std::env::var(crate::config::ENV_COLOR).is_err() {
            assert!(browser.config().colorize);
            assert!(!worker.config().colorize);
        }
    }

    #[test]
    fn test_environment_overlay_mapping() {
        let prod = environment_overlay("production");
        assert_eq!(prod.level, Some(LogLevel::Error));
        assert_eq!(prod.format, Some(OutputFormat::Json));
        assert_eq!(prod.colorize, Some(false));

        assert_eq!(environment_overlay("staging").level, Some(LogLevel::Warn));
        assert_eq!(environment_overlay("test").level, Some(LogLevel::Warn));
        assert_eq!(environment_overlay("dev").level, Some(LogLevel::Debug));
        assert_eq!(
            environment_overlay("Development").level,
            Some(LogLevel::Debug)
        );
        assert_eq!(environment_overlay("qa").level, Some(LogLevel::Info));
        assert_eq!(
            environment_overlay("qa").format,
            Some(OutputFormat::Text)
        );
    }
}
