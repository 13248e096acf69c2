//! End-to-end tests exercising the public API the way an application
//! would: build a logger, attach context, emit, and inspect what the
//! configured sink actually received.

use omnilog::console::ConsoleSink;
use omnilog::factory::create_with_profile;
use omnilog::{
    metadata, HostSignals, LogEntry, LogLevel, LogSink, Logger, LoggerConfig, OutputFormat,
    PartialConfig, RuntimeKind, RuntimeProfile,
};
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Sink that records every entry it receives.
#[derive(Default)]
struct CollectingSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl CollectingSink {
    fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl LogSink for CollectingSink {
    fn write(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

/// Byte buffer usable as a boxed console writer.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn profile_of(kind: RuntimeKind) -> RuntimeProfile {
    let signals = match kind {
        RuntimeKind::Server => HostSignals {
            node_version: Some("linux/x86_64".to_string()),
            ..bare_signals()
        },
        RuntimeKind::EdgeLike => HostSignals {
            deno_version: Some("1.44.0".to_string()),
            ..bare_signals()
        },
        RuntimeKind::Browser => HostSignals {
            has_window: true,
            has_document: true,
            ..bare_signals()
        },
        RuntimeKind::Worker => HostSignals {
            has_import_scripts: true,
            ..bare_signals()
        },
        RuntimeKind::Unknown => bare_signals(),
    };
    RuntimeProfile::from_signals(&signals)
}

fn bare_signals() -> HostSignals {
    HostSignals {
        deno_version: None,
        bun_version: None,
        has_window: false,
        has_document: false,
        has_import_scripts: false,
        node_version: None,
    }
}

fn collecting_logger(level: LogLevel) -> (Logger, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::default());
    let mut config = LoggerConfig::defaults(false);
    config.level = level;
    let logger = Logger::new(config, profile_of(RuntimeKind::Server), sink.clone());
    (logger, sink)
}

#[test]
fn test_warn_threshold_emits_only_warn_and_error() {
    let (logger, sink) = collecting_logger(LogLevel::Warn);

    logger.debug("never", None);
    logger.info("never", None);
    logger.warn("low disk space", Some(metadata! { "free_pct" => 5 }));
    logger.error("write failed", None);

    let entries = sink.snapshot();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].level, LogLevel::Warn);
    assert_eq!(entries[0].message, "low disk space");
    assert!(entries[0].metadata.is_some());
    assert_eq!(entries[1].level, LogLevel::Error);
}

#[test]
fn test_child_inherits_and_extends_context() {
    let (logger, sink) = collecting_logger(LogLevel::Info);
    let request = logger.child(metadata! { "request_id" => "r-17" });
    let handler = request.child(metadata! { "handler" => "upload" });

    handler.info("accepted", Some(metadata! { "bytes" => 1024 }));

    let entries = sink.snapshot();
    assert_eq!(entries.len(), 1);
    let meta = entries[0].metadata.as_ref().unwrap();
    assert!(meta.contains_key("request_id"));
    assert!(meta.contains_key("handler"));
    assert!(meta.contains_key("bytes"));

    // Parent is untouched by the child's context.
    logger.info("plain", None);
    assert!(sink.snapshot()[1].metadata.is_none());
}

#[test]
fn test_set_level_takes_effect_immediately() {
    let (logger, sink) = collecting_logger(LogLevel::Error);
    logger.info("dropped", None);
    logger.set_level(LogLevel::Debug);
    logger.debug("kept", None);

    let entries = sink.snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "kept");
}

#[test]
fn test_silent_threshold_suppresses_everything() {
    let (logger, sink) = collecting_logger(LogLevel::Silent);
    logger.debug("never", None);
    logger.info("never", None);
    logger.warn("never", None);
    logger.error("never", None);
    assert!(sink.snapshot().is_empty());
}

#[test]
fn test_console_json_output_end_to_end() {
    let out = SharedBuf::default();
    let err = SharedBuf::default();
    let mut config = LoggerConfig::defaults(false);
    config.format = OutputFormat::Json;
    let sink = ConsoleSink::with_writers(config.clone(), Box::new(out.clone()), Box::new(err.clone()));
    let logger = Logger::new(config, profile_of(RuntimeKind::Server), Arc::new(sink));

    logger.warn("low disk space", Some(metadata! { "free_pct" => 5 }));

    let line = err.contents();
    assert!(out.contents().is_empty());
    let parsed: serde_json::Value = serde_json::from_str(line.trim()).expect("one JSON line");
    assert_eq!(parsed["level"], "warn");
    assert_eq!(parsed["message"], "low disk space");
    assert_eq!(parsed["runtime"], "server");
    assert_eq!(parsed["metadata"]["free_pct"], 5);
    assert!(parsed.as_object().unwrap().contains_key("timestamp"));
}

#[test]
fn test_console_text_routing_by_level() {
    let out = SharedBuf::default();
    let err = SharedBuf::default();
    let mut config = LoggerConfig::defaults(false);
    config.level = LogLevel::Debug;
    let sink = ConsoleSink::with_writers(config.clone(), Box::new(out.clone()), Box::new(err.clone()));
    let logger = Logger::new(config, profile_of(RuntimeKind::Unknown), Arc::new(sink));

    logger.debug("d", None);
    logger.info("i", None);
    logger.warn("w", None);
    logger.error("e", None);

    let out_text = out.contents();
    let err_text = err.contents();
    assert!(out_text.contains("DEBUG") && out_text.contains("INFO"));
    assert!(err_text.contains("WARN") && err_text.contains("ERROR"));
}

#[test]
fn test_factory_selects_console_for_capability_less_hosts() {
    for kind in [RuntimeKind::Browser, RuntimeKind::Worker, RuntimeKind::Unknown] {
        let logger = create_with_profile(profile_of(kind), &PartialConfig::default());
        assert_eq!(logger.runtime().kind, kind);
        // Emitting through the real console sink must not panic even on
        // hosts without declared stream support.
        logger.error("factory smoke", None);
    }
}

#[test]
fn test_factory_honors_user_overlay() {
    let user = PartialConfig::with_level(LogLevel::Error);
    let logger = create_with_profile(profile_of(RuntimeKind::Server), &user);
    assert_eq!(logger.level(), LogLevel::Error);
}

#[test]
fn test_logging_macros_defer_formatting() {
    let (logger, sink) = collecting_logger(LogLevel::Warn);

    omnilog::log_warn!(logger, "attempt {} of {}", 2, 3);
    omnilog::log_debug!(logger, "{}", expensive());

    let entries = sink.snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "attempt 2 of 3");
    assert!(!EXPENSIVE_CALLED.load(std::sync::atomic::Ordering::SeqCst));
}

static EXPENSIVE_CALLED: std::sync::atomic::AtomicBool =
    std::sync::atomic::AtomicBool::new(false);

fn expensive() -> String {
    EXPENSIVE_CALLED.store(true, std::sync::atomic::Ordering::SeqCst);
    "expensive".to_string()
}
