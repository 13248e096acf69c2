//! # Backend Sink Module
//!
//! Sink for server-capable runtimes that delegates records to an
//! optional external structured-logging backend — the `log` facade —
//! when one is installed, and falls back to console behavior when it
//! is not.
//!
//! ## Acquisition Model
//!
//! The backend is probed once, at construction: an installed `log`
//! logger always has a non-`Off` maximum level, so `log::max_level()`
//! is the presence signal. The console fallback is also built at
//! construction, so records logged without a backend are never
//! dropped. When the crate is compiled without the `log-backend`
//! feature the probe is skipped entirely and every write takes the
//! console path.
//!
//! A single diagnostic line announces the fallback the first time it
//! is used; it is never repeated per call.

use crate::config::LoggerConfig;
use crate::console::ConsoleSink;
use crate::dispatch::{LogEntry, LogSink};
use crate::level::LogLevel;
#[cfg(feature = "log-backend")]
use crate::serializer;
use std::sync::Once;

/// Sink that prefers an installed `log`-facade backend and keeps its
/// threshold in sync, with console fallback established up front.
pub struct BackendSink {
    console: ConsoleSink,
    #[cfg(feature = "log-backend")]
    backend_active: bool,
    fallback_notice: Once,
}

impl BackendSink {
    /// Probe the backend and build the fallback path.
    pub fn new(config: LoggerConfig) -> Self {
        Self::over_console(ConsoleSink::new(config))
    }

    /// Like [`BackendSink::new`] but over a caller-supplied console
    /// sink (used by tests to capture fallback output).
    pub fn over_console(console: ConsoleSink) -> Self {
        BackendSink {
            console,
            #[cfg(feature = "log-backend")]
            backend_active: log::max_level() != log::LevelFilter::Off,
            fallback_notice: Once::new(),
        }
    }

    #[cfg(all(test, feature = "log-backend"))]
    fn with_parts(console: ConsoleSink, backend_active: bool) -> Self {
        BackendSink {
            console,
            backend_active,
            fallback_notice: Once::new(),
        }
    }

    /// Whether an external backend was acquired at construction.
    pub fn backend_active(&self) -> bool {
        #[cfg(feature = "log-backend")]
        {
            self.backend_active
        }
        #[cfg(not(feature = "log-backend"))]
        {
            false
        }
    }

    /// One-time fallback diagnostic through the console path.
    fn note_fallback(&self, runtime: crate::runtime::RuntimeKind) {
        self.fallback_notice.call_once(|| {
            #[cfg(feature = "log-backend")]
            let message = "structured logging backend not installed; using console output";
            #[cfg(not(feature = "log-backend"))]
            let message = "structured logging backend support not compiled in; using console output";

            self.console.write(&LogEntry {
                timestamp: chrono::Utc::now(),
                level: LogLevel::Debug,
                message: message.to_string(),
                metadata: None,
                runtime,
            });
        });
    }

    #[cfg(feature = "log-backend")]
    fn delegate(&self, entry: &LogEntry) {
        let Some(level) = entry.level.to_backend_level() else {
            return;
        };
        let rendered;
        let text: &str = match &entry.metadata {
            Some(metadata) => {
                rendered = format!(
                    "{} {}",
                    entry.message,
                    serializer::serialize_metadata(metadata, None)
                );
                &rendered
            }
            None => &entry.message,
        };
        log::logger().log(
            &log::Record::builder()
                .args(format_args!("{}", text))
                .level(level)
                .target("omnilog")
                .build(),
        );
    }
}

impl LogSink for BackendSink {
    fn write(&self, entry: &LogEntry) {
        #[cfg(feature = "log-backend")]
        if self.backend_active {
            self.delegate(entry);
            return;
        }
        self.note_fallback(entry.runtime);
        self.console.write(entry);
    }

    fn set_min_level(&self, _level: LogLevel) {
        #[cfg(feature = "log-backend")]
        if self.backend_active {
            log::set_max_level(_level.to_backend_filter());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerConfig;
    use crate::runtime::RuntimeKind;
    use chrono::Utc;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
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

    fn captured_console() -> (ConsoleSink, SharedBuf, SharedBuf) {
        let out = SharedBuf::default();
        let err = SharedBuf::default();
        let console = ConsoleSink::with_writers(
            LoggerConfig::defaults(false),
            Box::new(out.clone()),
            Box::new(err.clone()),
        );
        (console, out, err)
    }

    fn entry(level: LogLevel, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            metadata: None,
            runtime: RuntimeKind::Server,
        }
    }

    #[cfg(feature = "log-backend")]
    mod with_backend {
        use super::*;
        use serial_test::serial;

        struct CaptureLogger {
            records: Mutex<Vec<(log::Level, String)>>,
        }

        impl log::Log for CaptureLogger {
            fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
                true
            }

            fn log(&self, record: &log::Record<'_>) {
                self.records
                    .lock()
                    .unwrap()
                    .push((record.level(), record.args().to_string()));
            }

            fn flush(&self) {}
        }

        static CAPTURE: CaptureLogger = CaptureLogger {
            records: Mutex::new(Vec::new()),
        };

        fn install_capture_backend() {
            // First installer wins; later calls keep the same logger.
            let _ = log::set_logger(&CAPTURE);
            log::set_max_level(log::LevelFilter::Debug);
        }

        #[test]
        #[serial]
        fn test_active_backend_receives_records() {
            install_capture_backend();
            let (console, out, err) = captured_console();
            let sink = BackendSink::with_parts(console, true);

            let mut record = entry(LogLevel::Warn, "disk low");
            record.metadata = Some(crate::metadata! { "pct" => 5 });
            sink.write(&record);

            let records = CAPTURE.records.lock().unwrap();
            let (level, text) = records.last().expect("delegated record");
            assert_eq!(*level, log::Level::Warn);
            assert_eq!(text, "disk low {\"pct\":5}");
            drop(records);

            assert!(out.contents().is_empty(), "no console output when delegating");
            assert!(err.contents().is_empty());
        }

        #[test]
        #[serial]
        fn test_set_min_level_syncs_backend_threshold() {
            install_capture_backend();
            let (console, _out, _err) = captured_console();
            let sink = BackendSink::with_parts(console, true);

            sink.set_min_level(LogLevel::Error);
            assert_eq!(log::max_level(), log::LevelFilter::Error);

            sink.set_min_level(LogLevel::Silent);
            assert_eq!(log::max_level(), log::LevelFilter::Off);

            // Restore for neighboring tests.
            log::set_max_level(log::LevelFilter::Debug);
        }

        #[test]
        #[serial]
        fn test_inactive_backend_falls_back_with_one_notice() {
            let (console, out, err) = captured_console();
            let sink = BackendSink::with_parts(console, false);

            sink.write(&entry(LogLevel::Info, "first"));
            sink.write(&entry(LogLevel::Info, "second"));

            let stdout = out.contents();
            assert_eq!(
                stdout.matches("backend not installed").count(),
                1,
                "fallback notice must appear exactly once"
            );
            assert!(stdout.contains("INFO: first"));
            assert!(stdout.contains("INFO: second"));
            assert!(err.contents().is_empty());
        }
    }

    #[cfg(not(feature = "log-backend"))]
    #[test]
    fn test_compiled_out_backend_always_uses_console() {
        let (console, out, _err) = captured_console();
        let sink = BackendSink::over_console(console);
        assert!(!sink.backend_active());
        sink.write(&entry(LogLevel::Info, "hello"));
        assert!(out.contents().contains("INFO: hello"));
        assert!(out.contents().contains("not compiled in"));
    }
}
