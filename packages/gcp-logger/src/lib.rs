//! Cloud Logging structured logger with a resettable singleton registry.
//!
//! Application code asks for the logger through [`get_logger`] (or an owned
//! [`LoggerRegistry`]). The first call builds a `tracing` pipeline that writes
//! Cloud Logging JSON lines; every later call returns that same instance
//! until [`reset`] discards it.
//!
//! ```no_run
//! let logger = gcp_logger::get_logger("checkout").expect("logging configuration");
//! logger.info("service started");
//! logger.in_scope(|| tracing::warn!(order_id = 42, "payment retried"));
//! ```

pub mod error;
pub mod format;
pub mod logger;
pub mod redact;
pub mod registry;
pub mod settings;
pub mod severity;
pub mod sink;

pub use error::ConfigurationError;
pub use format::CloudLoggingFormat;
pub use logger::LoggerHandle;
pub use registry::{current, get_logger, is_configured, reset, set_settings, LoggerRegistry};
pub use settings::LoggerSettings;
pub use severity::Severity;
pub use sink::{SharedBuffer, SinkSpec};
