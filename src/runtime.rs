//! # Runtime Capability Detection Module
//!
//! This module inspects the hosting environment once, at sink
//! construction time, and reports a discrete runtime identity together
//! with the capability set that drives adapter selection and default
//! formatting behavior.
//!
//! ## Detection Model
//!
//! Detection is a pure function of a [`HostSignals`] snapshot. The
//! snapshot is captured from the ambient environment (environment
//! markers on native targets, compile-target evidence on wasm), and the
//! classification order is fixed and deterministic:
//!
//! 1. Deno-like marker       → edge-like runtime
//! 2. Bun-like marker        → edge-like runtime
//! 3. window + document      → browser
//! 4. importScripts, no window → worker
//! 5. Node-like process info → server
//! 6. anything else          → unknown (all capabilities off)
//!
//! There is no error path: ambiguous environments resolve to the most
//! conservative profile rather than failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete identity of the hosting runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeKind {
    /// Full server runtime: file system, process metadata, streams
    Server,
    /// Edge-style runtime (Deno/Bun-like): server-capable but without
    /// full process metadata
    EdgeLike,
    /// Browser main thread: console output only, CSS/ANSI color capable
    Browser,
    /// Dedicated worker context: console output only
    Worker,
    /// Unrecognized host; all capabilities disabled
    Unknown,
}

impl RuntimeKind {
    /// Kebab-case name used in log records and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Server => "server",
            RuntimeKind::EdgeLike => "edge-like",
            RuntimeKind::Browser => "browser",
            RuntimeKind::Worker => "worker",
            RuntimeKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature set of the detected host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Host can open and write files
    pub file_system: bool,
    /// Output channel understands color styling
    pub color_support: bool,
    /// Process metadata (pid, argv, env) is available
    pub process_info: bool,
    /// Host exposes writable byte streams
    pub streams: bool,
}

impl Capabilities {
    /// Fixed capability table keyed by runtime identity.
    pub fn for_kind(kind: RuntimeKind) -> Self {
        match kind {
            RuntimeKind::Server => Capabilities {
                file_system: true,
                color_support: true,
                process_info: true,
                streams: true,
            },
            RuntimeKind::EdgeLike => Capabilities {
                file_system: true,
                color_support: true,
                process_info: false,
                streams: true,
            },
            RuntimeKind::Browser => Capabilities {
                file_system: false,
                color_support: true,
                process_info: false,
                streams: false,
            },
            RuntimeKind::Worker | RuntimeKind::Unknown => Capabilities {
                file_system: false,
                color_support: false,
                process_info: false,
                streams: false,
            },
        }
    }

    fn none() -> Self {
        Capabilities::for_kind(RuntimeKind::Unknown)
    }
}

/// Immutable description of the detected runtime.
///
/// Computed once per sink construction and owned by the requesting sink;
/// detection is never repeated per log call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeProfile {
    /// Resolved runtime identity
    pub kind: RuntimeKind,
    /// Host version string when the environment reports one
    pub version: Option<String>,
    /// Capability set from the fixed lookup table
    pub capabilities: Capabilities,
}

impl RuntimeProfile {
    /// Classify a signal snapshot. Pure; the precedence order documented
    /// at module level is load-bearing and must not be reordered.
    pub fn from_signals(signals: &HostSignals) -> Self {
        if let Some(version) = &signals.deno_version {
            return RuntimeProfile::of(RuntimeKind::EdgeLike, Some(version.clone()));
        }
        if let Some(version) = &signals.bun_version {
            return RuntimeProfile::of(RuntimeKind::EdgeLike, Some(version.clone()));
        }
        if signals.has_window && signals.has_document {
            return RuntimeProfile::of(RuntimeKind::Browser, None);
        }
        if signals.has_import_scripts && !signals.has_window {
            return RuntimeProfile::of(RuntimeKind::Worker, None);
        }
        if let Some(version) = &signals.node_version {
            return RuntimeProfile::of(RuntimeKind::Server, Some(version.clone()));
        }
        RuntimeProfile {
            kind: RuntimeKind::Unknown,
            version: None,
            capabilities: Capabilities::none(),
        }
    }

    fn of(kind: RuntimeKind, version: Option<String>) -> Self {
        RuntimeProfile {
            kind,
            version,
            capabilities: Capabilities::for_kind(kind),
        }
    }
}

/// Ambient evidence consumed by the detector.
///
/// `capture()` reads the real environment; tests construct snapshots
/// directly to exercise every branch of the precedence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSignals {
    /// Version marker exported by Deno-like hosts
    pub deno_version: Option<String>,
    /// Version marker exported by Bun-like hosts
    pub bun_version: Option<String>,
    /// Browser main-thread signal
    pub has_window: bool,
    /// Browser document signal (checked together with `has_window`)
    pub has_document: bool,
    /// Worker-context signal
    pub has_import_scripts: bool,
    /// Node-like process signal with optional version
    pub node_version: Option<String>,
}

impl HostSignals {
    /// Snapshot the ambient environment.
    ///
    /// On native targets a process environment is always available, so
    /// the server signal is derived from the host OS identity; embedding
    /// runtimes advertise themselves through version markers in the
    /// process environment. On wasm32 the browser signal applies.
    pub fn capture() -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            HostSignals {
                has_window: true,
                has_document: true,
                ..HostSignals::default()
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            HostSignals {
                deno_version: non_empty_env("DENO_VERSION"),
                bun_version: non_empty_env("BUN_VERSION"),
                has_window: false,
                has_document: false,
                has_import_scripts: false,
                node_version: Some(host_version()),
            }
        }
    }
}

/// Detect the current runtime profile.
///
/// Pure given the ambient environment; each sink calls this once at
/// construction rather than caching a process-wide global.
pub fn detect() -> RuntimeProfile {
    RuntimeProfile::from_signals(&HostSignals::capture())
}

#[cfg(not(target_arch = "wasm32"))]
fn non_empty_env(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

/// Host identity string for the server profile, e.g. `linux/x86_64`.
#[cfg(not(target_arch = "wasm32"))]
fn host_version() -> String {
    format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_detection_is_server_capable() {
        let profile = detect();
        // Native test hosts always classify as a file-system-capable
        // runtime unless an embedding marker is exported.
        assert!(matches!(
            profile.kind,
            RuntimeKind::Server | RuntimeKind::EdgeLike
        ));
        assert!(profile.capabilities.file_system);
    }

    #[test]
    fn test_deno_marker_wins_over_node() {
        let signals = HostSignals {
            deno_version: Some("1.44".to_string()),
            node_version: Some("20.0".to_string()),
            ..HostSignals::default()
        };
        let profile = RuntimeProfile::from_signals(&signals);
        assert_eq!(profile.kind, RuntimeKind::EdgeLike);
        assert_eq!(profile.version.as_deref(), Some("1.44"));
    }

    #[test]
    fn test_bun_marker_after_deno() {
        let signals = HostSignals {
            bun_version: Some("1.1".to_string()),
            node_version: Some("20.0".to_string()),
            ..HostSignals::default()
        };
        assert_eq!(
            RuntimeProfile::from_signals(&signals).kind,
            RuntimeKind::EdgeLike
        );
    }

    #[test]
    fn test_browser_requires_window_and_document() {
        let full = HostSignals {
            has_window: true,
            has_document: true,
            ..HostSignals::default()
        };
        assert_eq!(RuntimeProfile::from_signals(&full).kind, RuntimeKind::Browser);

        // A window without a document is not a browser signal.
        let partial = HostSignals {
            has_window: true,
            ..HostSignals::default()
        };
        assert_eq!(
            RuntimeProfile::from_signals(&partial).kind,
            RuntimeKind::Unknown
        );
    }

    #[test]
    fn test_worker_signal_excludes_window() {
        let worker = HostSignals {
            has_import_scripts: true,
            ..HostSignals::default()
        };
        assert_eq!(RuntimeProfile::from_signals(&worker).kind, RuntimeKind::Worker);

        // importScripts alongside a window resolves by the earlier
        // browser check, never as a worker.
        let both = HostSignals {
            has_window: true,
            has_document: true,
            has_import_scripts: true,
            ..HostSignals::default()
        };
        assert_eq!(RuntimeProfile::from_signals(&both).kind, RuntimeKind::Browser);
    }

    #[test]
    fn test_node_signal_resolves_server() {
        let signals = HostSignals {
            node_version: Some("linux/x86_64".to_string()),
            ..HostSignals::default()
        };
        let profile = RuntimeProfile::from_signals(&signals);
        assert_eq!(profile.kind, RuntimeKind::Server);
        assert!(profile.capabilities.process_info);
    }

    #[test]
    fn test_empty_signals_resolve_unknown() {
        let profile = RuntimeProfile::from_signals(&HostSignals::default());
        assert_eq!(profile.kind, RuntimeKind::Unknown);
        assert_eq!(profile.capabilities, Capabilities::none());
        assert!(profile.version.is_none());
    }

    #[test]
    fn test_capability_table() {
        assert!(Capabilities::for_kind(RuntimeKind::Server).process_info);
        assert!(Capabilities::for_kind(RuntimeKind::EdgeLike).file_system);
        assert!(!Capabilities::for_kind(RuntimeKind::EdgeLike).process_info);
        assert!(Capabilities::for_kind(RuntimeKind::Browser).color_support);
        assert!(!Capabilities::for_kind(RuntimeKind::Browser).file_system);
        assert!(!Capabilities::for_kind(RuntimeKind::Worker).color_support);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(RuntimeKind::EdgeLike.as_str(), "edge-like");
        assert_eq!(RuntimeKind::Unknown.to_string(), "unknown");
    }
}
