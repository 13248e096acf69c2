//! # Omnilog - Cross-Runtime Logging Facade
//!
//! Omnilog is a single logging interface that picks a concrete output
//! implementation for the host it finds itself on: a backend-integrated
//! sink on server-capable runtimes, a console sink everywhere else. On
//! top of that selection it layers lazy message evaluation, structured
//! metadata, contextual child loggers, and serialization that survives
//! circular structures, errors, and non-JSON values.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ Factory Module  │    │ Runtime Module  │    │ Config Module   │
//! │                 │    │                 │    │                 │
//! │ • create()      │◄──►│ • detect()      │    │ • defaults      │
//! │ • env mapping   │    │ • capabilities  │◄──►│ • file + env    │
//! │ • sink choice   │    │ • profile       │    │ • merge law     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!           │                                            │
//!           └──────────────────┬─────────────────────────┘
//!                              │
//!                     ┌─────────────────┐
//!                     │ Dispatch Engine │
//!                     │                 │
//!                     │ • level gate    │
//!                     │ • lazy resolve  │
//!                     │ • child merge   │
//!                     └────────┬────────┘
//!                              │ LogSink
//!                 ┌────────────┴────────────┐
//!        ┌────────▼────────┐      ┌─────────▼─────────┐
//!        │  Console Sink   │◄─────│   Backend Sink    │
//!        │  stdout/stderr  │ fall │   `log` facade    │
//!        └─────────────────┘ back └───────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use omnilog::{factory, metadata, LogLevel, PartialConfig};
//!
//! let logger = factory::create(&PartialConfig::with_level(LogLevel::Warn));
//! logger.warn("low disk", Some(metadata! { "pct" => 5 }));
//!
//! // Child loggers inherit metadata without sharing mutable state.
//! let request_log = logger.child(metadata! { "request_id" => "abc-123" });
//! request_log.error("upstream timed out", None);
//!
//! // Filtered calls never pay for message construction.
//! omnilog::log_debug!(logger, "state dump: {:?}", vec![1, 2, 3]);
//! ```
//!
//! ## Guarantees
//!
//! - **Zero-cost filtering**: a filtered call is one atomic load and a
//!   comparison; lazy messages and `log_*!` macros defer formatting.
//! - **Never throws**: no logging call panics or returns an error;
//!   internal failures degrade through fallback chains.
//! - **Safe serialization**: [`serializer::serialize`] always returns
//!   valid JSON, whatever the value shape.
//! - **Independent children**: [`Logger::child`] copies level, config,
//!   and metadata; parent and child share only the output sink.

pub mod backend; // Backend-integrated sink over the optional `log` facade
pub mod config; // Configuration types, merge law, env and file layers
pub mod console; // Console sink with leveled channel routing
pub mod dispatch; // Dispatch engine, Logger, LogEntry, LogSink seam
pub mod factory; // Runtime-driven logger construction
pub mod format; // Text and JSON record rendering
pub mod global; // Explicit opt-in process-wide logger
pub mod level; // Ordered severity scale
pub mod runtime; // Host capability detection
pub mod serializer; // Safe serialization and redaction utilities
pub mod value; // Metadata value tree

pub use config::{LoggerConfig, OutputFormat, PartialConfig, TransportConfig, TransportKind};
pub use dispatch::{LogEntry, LogMessage, LogSink, Logger};
pub use factory::{create, create_default, create_for_environment, create_with_profile};
pub use level::LogLevel;
pub use runtime::{detect, Capabilities, HostSignals, RuntimeKind, RuntimeProfile};
pub use serializer::{redact, redact_default, serialize, to_error_record};
pub use value::{ErrorRecord, FieldValue, Metadata};
