//! Cloud Logging structured JSON event format.
//!
//! Each event becomes one line the logging agent understands: `severity`,
//! `message`, `time`, the `logging.googleapis.com/*` special fields, and the
//! remaining event and span fields as top-level members (`jsonPayload`).

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;

use crate::redact::redact;
use crate::severity::Severity;

pub const LABELS_KEY: &str = "logging.googleapis.com/labels";
pub const SOURCE_LOCATION_KEY: &str = "logging.googleapis.com/sourceLocation";
pub const TRACE_KEY: &str = "logging.googleapis.com/trace";
pub const SPAN_ID_KEY: &str = "logging.googleapis.com/spanId";

/// Field names with special meaning on events and spans.
pub(crate) const SEVERITY_FIELD: &str = "severity";
const MESSAGE_FIELD: &str = "message";
const TRACE_ID_FIELD: &str = "trace_id";
const SPAN_ID_FIELD: &str = "span_id";

/// `FormatEvent` producing Cloud Logging entries.
///
/// Span fields are read from the `FormattedFields` the fmt layer stores, so
/// the layer must be paired with `JsonFields`.
#[derive(Debug, Clone)]
pub struct CloudLoggingFormat {
    logger: String,
    project_id: Option<String>,
    labels: BTreeMap<String, String>,
    source_location: bool,
    redact_pii: bool,
}

impl CloudLoggingFormat {
    pub fn new(logger: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
            project_id: None,
            labels: BTreeMap::new(),
            source_location: true,
            redact_pii: false,
        }
    }

    pub fn with_project_id(mut self, project_id: Option<String>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
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

    fn scrub(&self, value: Value) -> Value {
        match value {
            Value::String(s) if self.redact_pii => Value::String(redact(&s).into_owned()),
            other => other,
        }
    }

    /// Build the JSON entry for one event. Separated from `format_event` so
    /// the shape can be tested without a subscriber.
    pub(crate) fn entry(
        &self,
        level: &Level,
        event_fields: Map<String, Value>,
        span_fields: Map<String, Value>,
        location: Option<(&str, Option<u32>, &str)>,
        now: OffsetDateTime,
    ) -> Map<String, Value> {
        let mut payload = span_fields;
        let mut trace_id = take_string(&mut payload, TRACE_ID_FIELD);
        let mut span_id = take_string(&mut payload, SPAN_ID_FIELD);

        let mut severity = Severity::from(level);
        let mut message = None;
        for (key, value) in event_fields {
            match key.as_str() {
                MESSAGE_FIELD => message = Some(value),
                SEVERITY_FIELD => {
                    if let Some(explicit) = value.as_str().and_then(Severity::parse) {
                        severity = explicit;
                    }
                }
                TRACE_ID_FIELD if value.is_string() => trace_id = value.as_str().map(str::to_owned),
                SPAN_ID_FIELD if value.is_string() => span_id = value.as_str().map(str::to_owned),
                _ => {
                    payload.insert(key, value);
                }
            }
        }

        let mut entry = Map::new();
        entry.insert("severity".into(), Value::from(severity.as_str()));
        let message = message.map(value_to_message).unwrap_or_default();
        entry.insert("message".into(), self.scrub(Value::String(message)));
        let time = now.format(&Rfc3339).unwrap_or_default();
        entry.insert("time".into(), Value::String(time));
        entry.insert("logger".into(), Value::String(self.logger.clone()));

        if !self.labels.is_empty() {
            let labels = self
                .labels
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            entry.insert(LABELS_KEY.into(), Value::Object(labels));
        }

        if self.source_location {
            if let Some((file, line, function)) = location {
                let mut loc = Map::new();
                loc.insert("file".into(), Value::from(file));
                if let Some(line) = line {
                    // Cloud Logging expects line as a string (int64 in proto JSON).
                    loc.insert("line".into(), Value::String(line.to_string()));
                }
                loc.insert("function".into(), Value::from(function));
                entry.insert(SOURCE_LOCATION_KEY.into(), Value::Object(loc));
            }
        }

        match (self.project_id.as_deref(), trace_id) {
            (Some(project), Some(trace)) => {
                entry.insert(
                    TRACE_KEY.into(),
                    Value::String(format!("projects/{project}/traces/{trace}")),
                );
            }
            // No project to qualify it with; keep the bare id in jsonPayload.
            (None, Some(trace)) => {
                payload.insert(TRACE_ID_FIELD.into(), Value::String(trace));
            }
            (_, None) => {}
        }
        if let Some(span) = span_id {
            entry.insert(SPAN_ID_KEY.into(), Value::String(span));
        }

        for (key, value) in payload {
            if !entry.contains_key(&key) {
                entry.insert(key, self.scrub(value));
            }
        }
        entry
    }
}

impl<S, N> FormatEvent<S, N> for CloudLoggingFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let mut span_fields = Map::new();
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let ext = span.extensions();
                let Some(fields) = ext.get::<FormattedFields<N>>() else {
                    continue;
                };
                if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(fields) {
                    span_fields.extend(map);
                }
            }
        }

        let meta = event.metadata();
        let location = meta
            .file()
            .map(|file| (file, meta.line(), meta.module_path().unwrap_or(meta.target())));

        let entry = self.entry(
            meta.level(),
            visitor.0,
            span_fields,
            location,
            OffsetDateTime::now_utc(),
        );
        let line = serde_json::to_string(&entry).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            map.insert(key.to_string(), other);
            None
        }
        None => None,
    }
}

fn value_to_message(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Collects event fields into a JSON object.
#[derive(Default)]
struct JsonVisitor(Map<String, Value>);

impl Visit for JsonVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().into(), Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.0.insert(field.name().into(), Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().into(), Value::String(format!("{value:?}")));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn fixed_time() -> OffsetDateTime {
        datetime!(2024-03-01 12:30:00 UTC)
    }

    #[test]
    fn maps_level_and_core_fields() {
        let format = CloudLoggingFormat::new("svc-a");
        let entry = format.entry(
            &Level::WARN,
            fields(json!({"message": "disk almost full", "free_mb": 12})),
            Map::new(),
            Some(("src/disk.rs", Some(42), "app::disk")),
            fixed_time(),
        );

        assert_eq!(entry["severity"], "WARNING");
        assert_eq!(entry["message"], "disk almost full");
        assert_eq!(entry["time"], "2024-03-01T12:30:00Z");
        assert_eq!(entry["logger"], "svc-a");
        assert_eq!(entry["free_mb"], 12);
        assert_eq!(
            entry[SOURCE_LOCATION_KEY],
            json!({"file": "src/disk.rs", "line": "42", "function": "app::disk"})
        );
        assert!(!entry.contains_key(LABELS_KEY));
        assert!(!entry.contains_key(TRACE_KEY));
    }

    #[test]
    fn explicit_severity_field_wins() {
        let format = CloudLoggingFormat::new("svc");
        let entry = format.entry(
            &Level::ERROR,
            fields(json!({"message": "db down", "severity": "CRITICAL"})),
            Map::new(),
            None,
            fixed_time(),
        );
        assert_eq!(entry["severity"], "CRITICAL");

        let entry = format.entry(
            &Level::INFO,
            fields(json!({"message": "x", "severity": "LOUD"})),
            Map::new(),
            None,
            fixed_time(),
        );
        assert_eq!(entry["severity"], "INFO");
    }

    #[test]
    fn trace_needs_project_id() {
        let span_fields = fields(json!({"trace_id": "abc123", "span_id": "0007", "method": "GET"}));

        let without = CloudLoggingFormat::new("svc").entry(
            &Level::INFO,
            fields(json!({"message": "m"})),
            span_fields.clone(),
            None,
            fixed_time(),
        );
        assert!(!without.contains_key(TRACE_KEY));
        assert_eq!(without["trace_id"], "abc123");
        assert_eq!(without[SPAN_ID_KEY], "0007");
        assert_eq!(without["method"], "GET");

        let with = CloudLoggingFormat::new("svc")
            .with_project_id(Some("my-proj".into()))
            .entry(
                &Level::INFO,
                fields(json!({"message": "m"})),
                span_fields,
                None,
                fixed_time(),
            );
        assert_eq!(with[TRACE_KEY], "projects/my-proj/traces/abc123");
        assert!(!with.contains_key("trace_id"));
    }

    #[test]
    fn event_fields_override_span_fields() {
        let entry = CloudLoggingFormat::new("svc").entry(
            &Level::INFO,
            fields(json!({"message": "m", "user": "event"})),
            fields(json!({"user": "span", "route": "/ping"})),
            None,
            fixed_time(),
        );
        assert_eq!(entry["user"], "event");
        assert_eq!(entry["route"], "/ping");
    }

    #[test]
    fn reserved_keys_are_not_overwritten_by_payload() {
        let entry = CloudLoggingFormat::new("svc-real").entry(
            &Level::INFO,
            fields(json!({"message": "m", "logger": "imposter"})),
            Map::new(),
            None,
            fixed_time(),
        );
        assert_eq!(entry["logger"], "svc-real");
    }

    #[test]
    fn labels_and_redaction() {
        let mut labels = BTreeMap::new();
        labels.insert("env".to_string(), "prod".to_string());

        let entry = CloudLoggingFormat::new("svc")
            .with_labels(labels)
            .with_redact_pii(true)
            .with_source_location(false)
            .entry(
                &Level::INFO,
                fields(json!({"message": "login user@example.com", "email": "ops@test.org", "attempts": 3})),
                Map::new(),
                Some(("src/a.rs", Some(1), "a")),
                fixed_time(),
            );

        assert_eq!(entry[LABELS_KEY], json!({"env": "prod"}));
        assert_eq!(entry["message"], "login u***@example.com");
        assert_eq!(entry["email"], "o***@test.org");
        assert_eq!(entry["attempts"], 3);
        assert!(!entry.contains_key(SOURCE_LOCATION_KEY));
    }
}
