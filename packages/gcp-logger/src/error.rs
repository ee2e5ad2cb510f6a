use std::path::PathBuf;

use thiserror::Error;

/// Failure to construct or configure a logger.
///
/// Raised by [`crate::LoggerRegistry::get_logger`] and passed through to the
/// caller unchanged. The registry stays unconfigured when this is returned.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Logger name must not be empty")]
    EmptyName,

    #[error("Invalid log filter directive `{directive}`: {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Invalid value `{value}` for {key}: {reason}")]
    InvalidSetting {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Log sink {} is unavailable: {source}", path.display())]
    SinkUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigurationError {
    pub(crate) fn invalid_setting(
        key: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSetting {
            key,
            value: value.into(),
            reason: reason.into(),
        }
    }
}
