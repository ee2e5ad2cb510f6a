//! Singleton slot holding the one configured logger.
//!
//! [`LoggerRegistry`] is an ordinary value that can be owned and passed
//! around. The free functions at the bottom of this module operate on a
//! process-wide registry for callers that want a global accessor.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::logger::{in_managed_scope, LoggerHandle};
use crate::settings::LoggerSettings;

/// Owns at most one configured logger.
///
/// The first [`get_logger`](Self::get_logger) builds and configures the
/// logger; later calls return the same instance whatever name they pass.
/// [`reset`](Self::reset) is the only way to drop it again.
#[derive(Debug, Default)]
pub struct LoggerRegistry {
    /// `None` reads settings from the environment at configuration time.
    settings: Option<LoggerSettings>,
    instance: Option<LoggerHandle>,
}

impl LoggerRegistry {
    /// Registry that configures its logger with `settings`.
    pub fn new(settings: LoggerSettings) -> Self {
        Self {
            settings: Some(settings),
            instance: None,
        }
    }

    /// Registry that loads [`LoggerSettings::from_env`] when it configures.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Return the configured logger, building it first if needed.
    ///
    /// Once configured, `name` is ignored and the existing instance is
    /// returned. On error nothing is stored and the registry stays
    /// unconfigured.
    pub fn get_logger(&mut self, name: &str) -> Result<LoggerHandle, ConfigurationError> {
        if let Some(existing) = &self.instance {
            if existing.name() != name.trim() && !in_managed_scope() {
                debug!(
                    configured = existing.name(),
                    requested = name,
                    "logger already configured; requested name ignored"
                );
            }
            return Ok(existing.clone());
        }

        let settings = match &self.settings {
            Some(settings) => settings.clone(),
            None => LoggerSettings::from_env()?,
        };
        let logger = LoggerHandle::build(name, settings)?;
        if !in_managed_scope() {
            debug!(logger = logger.name(), id = logger.id(), "configured logger");
        }

        self.instance = Some(logger.clone());
        Ok(logger)
    }

    /// Drop the configured logger so the next `get_logger` starts over.
    pub fn reset(&mut self) {
        if let Some(old) = self.instance.take() {
            if !in_managed_scope() {
                debug!(logger = old.name(), id = old.id(), "logger registry reset");
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.instance.is_some()
    }

    /// The configured logger, without building one.
    pub fn current(&self) -> Option<LoggerHandle> {
        self.instance.clone()
    }

    /// Replace the settings used by the next configuration. `None` means the
    /// environment. An already configured logger is left untouched.
    pub fn set_settings(&mut self, settings: Option<LoggerSettings>) {
        self.settings = settings;
    }
}

static GLOBAL: Lazy<Mutex<LoggerRegistry>> = Lazy::new(|| Mutex::new(LoggerRegistry::from_env()));

/// [`LoggerRegistry::get_logger`] on the process-wide registry.
pub fn get_logger(name: &str) -> Result<LoggerHandle, ConfigurationError> {
    GLOBAL.lock().get_logger(name)
}

/// [`LoggerRegistry::reset`] on the process-wide registry. Meant for test
/// teardown; application code should never need it.
pub fn reset() {
    GLOBAL.lock().reset();
}

pub fn is_configured() -> bool {
    GLOBAL.lock().is_configured()
}

pub fn current() -> Option<LoggerHandle> {
    GLOBAL.lock().current()
}

/// [`LoggerRegistry::set_settings`] on the process-wide registry.
pub fn set_settings(settings: Option<LoggerSettings>) {
    GLOBAL.lock().set_settings(settings);
}
