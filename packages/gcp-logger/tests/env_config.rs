//! Process-wide registry configured from environment variables.

mod support;

use std::env;

use gcp_logger::settings::{ENV_LABELS, ENV_LOG_LEVEL, ENV_PROJECT, ENV_REDACT_PII, ENV_SINK};
use gcp_logger::ConfigurationError;
use gcp_logger_test_support::RegistryGuard;
use serial_test::serial;

const VARS: &[&str] = &[ENV_LOG_LEVEL, ENV_PROJECT, ENV_SINK, ENV_LABELS, ENV_REDACT_PII];

/// Sets variables for the test body and removes them afterwards.
struct EnvVars;

impl EnvVars {
    fn set(pairs: &[(&str, &str)]) -> Self {
        for key in VARS {
            env::remove_var(key);
        }
        for (key, value) in pairs {
            env::set_var(key, value);
        }
        EnvVars
    }
}

impl Drop for EnvVars {
    fn drop(&mut self) {
        for key in VARS {
            env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn file_sink_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.jsonl");
    let sink = format!("file:{}", path.display());
    let _env = EnvVars::set(&[
        (ENV_SINK, sink.as_str()),
        (ENV_LOG_LEVEL, "debug"),
        (ENV_PROJECT, "env-proj"),
        (ENV_LABELS, "env=ci,team=platform"),
        (ENV_REDACT_PII, "true"),
    ]);
    let _guard = RegistryGuard::fresh();

    let logger = gcp_logger::get_logger("env-svc").unwrap();
    assert_eq!(logger.settings().project_id.as_deref(), Some("env-proj"));
    logger.in_scope(|| {
        let span = tracing::info_span!("job", trace_id = "abc");
        let _entered = span.enter();
        tracing::debug!(contact = "jane@example.com", "sending report");
    });

    let written = std::fs::read_to_string(&path).unwrap();
    let entry: serde_json::Value = serde_json::from_str(written.lines().next().unwrap()).unwrap();
    assert_eq!(entry["severity"], "DEBUG");
    assert_eq!(entry["logger"], "env-svc");
    assert_eq!(entry["contact"], "j***@example.com");
    assert_eq!(entry["logging.googleapis.com/labels"]["team"], "platform");
    assert_eq!(entry["logging.googleapis.com/trace"], "projects/env-proj/traces/abc");
}

#[test]
#[serial]
fn environment_is_read_at_configuration_time() {
    let _env = EnvVars::set(&[(ENV_SINK, "pager")]);
    let _guard = RegistryGuard::fresh();

    assert!(matches!(
        gcp_logger::get_logger("svc"),
        Err(ConfigurationError::InvalidSetting { key: ENV_SINK, .. })
    ));
    assert!(!gcp_logger::is_configured());

    env::set_var(ENV_SINK, "stderr");
    let logger = gcp_logger::get_logger("svc").unwrap();
    assert!(matches!(logger.settings().sink, gcp_logger::SinkSpec::Stderr));
}

#[test]
#[serial]
fn unreachable_file_sink_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let sink = format!("file:{}", dir.path().join("no/such/dir/app.log").display());
    let _env = EnvVars::set(&[(ENV_SINK, sink.as_str())]);
    let _guard = RegistryGuard::fresh();

    let err = gcp_logger::get_logger("svc").unwrap_err();
    assert!(matches!(err, ConfigurationError::SinkUnavailable { .. }));
    assert!(!gcp_logger::is_configured());
}
