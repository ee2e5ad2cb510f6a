//! Logger settings and their environment loading.
//!
//! Everything a logger needs except its name. Settings are read from the
//! process environment only when a registry actually builds a logger, so a
//! reset followed by an environment change picks up the new values.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use crate::error::ConfigurationError;
use crate::sink::SinkSpec;

pub const ENV_LOG_LEVEL: &str = "GCP_LOG_LEVEL";
pub const ENV_PROJECT: &str = "GOOGLE_CLOUD_PROJECT";
pub const ENV_PROJECT_FALLBACK: &str = "GCP_PROJECT";
pub const ENV_SINK: &str = "GCP_LOG_SINK";
pub const ENV_LABELS: &str = "GCP_LOG_LABELS";
pub const ENV_SOURCE_LOCATION: &str = "GCP_LOG_SOURCE_LOCATION";
pub const ENV_REDACT_PII: &str = "GCP_LOG_REDACT_PII";

const DEFAULT_FILTER: &str = "info";

/// Configuration applied once when a logger is constructed.
#[derive(Debug, Clone)]
pub struct LoggerSettings {
    /// `EnvFilter` directive controlling the minimum level.
    pub filter: String,
    /// Project used to build `projects/<id>/traces/<trace>` references.
    pub project_id: Option<String>,
    /// Static labels attached to every entry.
    pub labels: BTreeMap<String, String>,
    pub sink: SinkSpec,
    pub source_location: bool,
    pub redact_pii: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            project_id: None,
            labels: BTreeMap::new(),
            sink: SinkSpec::Stdout,
            source_location: true,
            redact_pii: false,
        }
    }
}

impl LoggerSettings {
    /// Load settings from the process environment.
    ///
    /// The filter is read in order: `GCP_LOG_LEVEL` -> `RUST_LOG` -> `"info"`.
    /// The project is read from `GOOGLE_CLOUD_PROJECT`, then `GCP_PROJECT`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let filter = non_empty(ENV_LOG_LEVEL)
            .or_else(|| non_empty("RUST_LOG"))
            .unwrap_or(defaults.filter);

        let project_id = non_empty(ENV_PROJECT)
            .or_else(|| non_empty(ENV_PROJECT_FALLBACK))
            .map(|p| p.trim().to_string());

        let sink = match non_empty(ENV_SINK) {
            Some(raw) => parse_sink(&raw)?,
            None => defaults.sink,
        };

        let labels = match non_empty(ENV_LABELS) {
            Some(raw) => parse_labels(&raw)?,
            None => defaults.labels,
        };

        let source_location = match non_empty(ENV_SOURCE_LOCATION) {
            Some(raw) => parse_bool(ENV_SOURCE_LOCATION, &raw)?,
            None => defaults.source_location,
        };

        let redact_pii = match non_empty(ENV_REDACT_PII) {
            Some(raw) => parse_bool(ENV_REDACT_PII, &raw)?,
            None => defaults.redact_pii,
        };

        Ok(Self {
            filter,
            project_id,
            labels,
            sink,
            source_location,
            redact_pii,
        })
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_sink(mut self, sink: SinkSpec) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_source_location(mut self, enabled: bool) -> Self {
        self.source_location = enabled;
        self
    }

    pub fn with_redact_pii(mut self, enabled: bool) -> Self {
        self.redact_pii = enabled;
        self
    }
}

fn parse_sink(raw: &str) -> Result<SinkSpec, ConfigurationError> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "stdout" => return Ok(SinkSpec::Stdout),
        "stderr" => return Ok(SinkSpec::Stderr),
        _ => {}
    }

    match trimmed.strip_prefix("file:").map(str::trim) {
        Some(path) if !path.is_empty() => Ok(SinkSpec::File(PathBuf::from(path))),
        Some(_) => Err(ConfigurationError::invalid_setting(
            ENV_SINK,
            raw,
            "file sink needs a path",
        )),
        None => Err(ConfigurationError::invalid_setting(
            ENV_SINK,
            raw,
            "expected `stdout`, `stderr` or `file:<path>`",
        )),
    }
}

fn parse_labels(raw: &str) -> Result<BTreeMap<String, String>, ConfigurationError> {
    let mut labels = BTreeMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(ConfigurationError::invalid_setting(
                ENV_LABELS,
                raw,
                format!("label `{pair}` is not in key=value form"),
            ));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigurationError::invalid_setting(
                ENV_LABELS,
                raw,
                format!("label `{pair}` has an empty key"),
            ));
        }
        labels.insert(key.to_string(), value.trim().to_string());
    }
    Ok(labels)
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigurationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::invalid_setting(key, raw, "expected a boolean")),
    }
}
