//! The configured logger and its shared handle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{dispatcher, Dispatch, Level};
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigurationError;
use crate::format::CloudLoggingFormat;
use crate::settings::LoggerSettings;
use crate::severity::Severity;

/// Target of events emitted through [`LoggerHandle::log`]. Filter directives
/// such as `gcp_logger=debug` apply to them.
pub const LOG_TARGET: &str = "gcp_logger";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Shared handle to one configured logger.
///
/// Clones refer to the same instance; equality is identity. Each instance
/// owns its own `tracing` dispatch, so dropping the last handle discards the
/// whole pipeline without touching the process-wide default subscriber.
#[derive(Clone)]
pub struct LoggerHandle {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    id: u64,
    name: String,
    settings: LoggerSettings,
    dispatch: Dispatch,
}

impl LoggerHandle {
    /// Construct and configure a logger.
    ///
    /// Opens the sink, parses the level filter and installs the Cloud
    /// Logging formatter. Any failure is returned before a handle exists.
    pub fn build(name: &str, settings: LoggerSettings) -> Result<Self, ConfigurationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ConfigurationError::EmptyName);
        }

        let filter = EnvFilter::try_new(&settings.filter).map_err(|source| {
            ConfigurationError::InvalidFilter {
                directive: settings.filter.clone(),
                source,
            }
        })?;
        let sink = settings.sink.open()?;

        let format = CloudLoggingFormat::new(name)
            .with_project_id(settings.project_id.clone())
            .with_labels(settings.labels.clone())
            .with_source_location(settings.source_location)
            .with_redact_pii(settings.redact_pii);

        let layer = tracing_subscriber::fmt::layer()
            .fmt_fields(JsonFields::new())
            .event_format(format)
            .with_writer(sink);

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);

        Ok(Self {
            inner: Arc::new(LoggerInner {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                name: name.to_string(),
                settings,
                dispatch: Dispatch::new(subscriber),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Process-unique instance id. A rebuilt logger never reuses an id.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn settings(&self) -> &LoggerSettings {
        &self.inner.settings
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Run `f` with this logger as the thread's default dispatcher.
    ///
    /// `tracing` macros and spans used inside `f` are formatted and written
    /// by this logger, including their fields and span context.
    pub fn in_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        dispatcher::with_default(&self.inner.dispatch, f)
    }

    /// Whether an entry of `severity` passes the configured minimum level.
    pub fn enabled(&self, severity: Severity) -> bool {
        self.in_scope(|| match severity.level() {
            Level::ERROR => tracing::enabled!(target: LOG_TARGET, Level::ERROR),
            Level::WARN => tracing::enabled!(target: LOG_TARGET, Level::WARN),
            Level::INFO => tracing::enabled!(target: LOG_TARGET, Level::INFO),
            _ => tracing::enabled!(target: LOG_TARGET, Level::DEBUG),
        })
    }

    pub fn log(&self, severity: Severity, message: &str) {
        let severity_name = severity.as_str();
        self.in_scope(|| match severity.level() {
            Level::ERROR => {
                tracing::error!(target: LOG_TARGET, severity = severity_name, "{}", message)
            }
            Level::WARN => {
                tracing::warn!(target: LOG_TARGET, severity = severity_name, "{}", message)
            }
            Level::INFO => {
                tracing::info!(target: LOG_TARGET, severity = severity_name, "{}", message)
            }
            _ => tracing::debug!(target: LOG_TARGET, severity = severity_name, "{}", message),
        });
    }

    pub fn debug(&self, message: &str) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    pub fn notice(&self, message: &str) {
        self.log(Severity::Notice, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }

    pub fn critical(&self, message: &str) {
        self.log(Severity::Critical, message);
    }

    pub fn alert(&self, message: &str) {
        self.log(Severity::Alert, message);
    }

    pub fn emergency(&self, message: &str) {
        self.log(Severity::Emergency, message);
    }
}

/// Whether the thread's current dispatcher is one owned by a [`LoggerHandle`],
/// i.e. the caller is inside [`LoggerHandle::in_scope`].
pub(crate) fn in_managed_scope() -> bool {
    dispatcher::get_default(|current| current.is::<CloudLoggingFormat>())
}

impl PartialEq for LoggerHandle {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl Eq for LoggerHandle {}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}
