//! Shared formatting pipeline applied before any sink serializes an entry
//!
//! Steps, in order: timestamp stamping, error/stack normalization,
//! redaction, metadata injection.

use super::config::LoggerConfig;
use super::error::Result;
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::redaction::Redactor;
use super::timestamp::TimestampFormat;
use serde_json::{Map, Value};

/// A formatted entry, ready for a sink's own serialization step
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    level: LogLevel,
    fields: Map<String, Value>,
}

impl LogRecord {
    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn message(&self) -> &str {
        self.get("message").and_then(Value::as_str).unwrap_or_default()
    }

    /// Rendered timestamp, whether textual or numeric
    pub fn timestamp(&self) -> String {
        match self.get("timestamp") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Everything except timestamp, level and message
    pub fn extra_fields(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(key, _)| !matches!(key.as_str(), "timestamp" | "level" | "message"))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Single-line JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.fields)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.fields)
    }
}

#[derive(Debug, Clone)]
pub struct FormatPipeline {
    timestamp_format: TimestampFormat,
    include_stack: bool,
    redactor: Redactor,
    service_name: Option<String>,
}

impl FormatPipeline {
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            timestamp_format: config.timestamp_format.clone(),
            include_stack: config.include_stack,
            redactor: Redactor::new(&config.redacted_fields),
            service_name: config.service_name.clone(),
        }
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn format(&self, entry: &LogEntry) -> Result<LogRecord> {
        let mut value = entry.to_value()?;
        self.stamp_timestamp(entry, &mut value);
        self.normalize_error(&mut value);
        self.redactor.redact(&mut value);
        self.inject_metadata(&mut value);

        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(LogRecord {
            level: entry.level,
            fields,
        })
    }

    fn stamp_timestamp(&self, entry: &LogEntry, value: &mut Value) {
        let rendered = self.timestamp_format.format(&entry.timestamp);
        let stamped = if self.timestamp_format.is_numeric() {
            rendered
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::String(rendered))
        } else {
            Value::String(rendered)
        };
        value["timestamp"] = stamped;
    }

    fn normalize_error(&self, value: &mut Value) {
        if self.include_stack {
            return;
        }
        if let Some(Value::Object(error)) = value.get_mut("error") {
            error.remove("stack");
        }
    }

    fn inject_metadata(&self, value: &mut Value) {
        let Some(map) = value.as_object_mut() else {
            return;
        };
        if let Some(service) = &self.service_name {
            map.entry("service")
                .or_insert_with(|| Value::String(service.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_entry::{ErrorInfo, RequestView};
    use crate::core::redaction::REDACTED;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn entry() -> LogEntry {
        let mut entry = LogEntry::new(LogLevel::Info, "Incoming request");
        entry.timestamp = chrono::Utc
            .with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime");
        entry
    }

    #[test]
    fn test_record_shape() {
        let record = FormatPipeline::from_config(&LoggerConfig::new())
            .format(&entry())
            .unwrap();

        assert_eq!(record.level(), LogLevel::Info);
        assert_eq!(record.message(), "Incoming request");
        assert_eq!(record.timestamp(), "2025-01-08T10:30:45.000Z");
        assert_eq!(record.get("level"), Some(&json!("info")));
        assert!(record.extra_fields().is_empty());
    }

    #[test]
    fn test_numeric_timestamp() {
        let config = LoggerConfig::new().with_timestamp_format(TimestampFormat::UnixMillis);
        let record = FormatPipeline::from_config(&config).format(&entry()).unwrap();
        assert_eq!(record.get("timestamp"), Some(&json!(1736332245000_i64)));
    }

    #[test]
    fn test_redacts_nested_request_fields() {
        let mut e = entry();
        e.request = Some(RequestView {
            method: "POST".to_string(),
            url: "/login".to_string(),
            headers: BTreeMap::from([("Authorization".to_string(), "Bearer x".to_string())]),
            body: Some(json!({ "username": "ann", "password": "hunter2" })),
            params: None,
            query: None,
        });

        let record = FormatPipeline::from_config(&LoggerConfig::new()).format(&e).unwrap();
        let request = record.get("request").unwrap();
        assert_eq!(request["headers"]["Authorization"], REDACTED);
        assert_eq!(request["body"]["password"], REDACTED);
        assert_eq!(request["body"]["username"], "ann");
    }

    #[test]
    fn test_stack_removed_when_disabled() {
        let mut e = entry();
        e.error = Some(ErrorInfo::new("E", "m").with_stack("frames"));

        let record = FormatPipeline::from_config(&LoggerConfig::new().with_stack(false))
            .format(&e)
            .unwrap();
        let error = record.get("error").unwrap();
        assert!(error.get("stack").is_none());
        assert_eq!(error["name"], "E");
    }

    #[test]
    fn test_service_injection() {
        let pipeline = FormatPipeline::from_config(&LoggerConfig::new().with_service_name("api"));

        let record = pipeline.format(&entry()).unwrap();
        assert_eq!(record.get("service"), Some(&json!("api")));

        let mut e = entry();
        e.service = Some("worker".to_string());
        let record = pipeline.format(&e).unwrap();
        assert_eq!(record.get("service"), Some(&json!("worker")));
    }
}
