//! Integration tests for service_logger
//!
//! These tests verify:
//! - Redaction of nested request and metadata fields
//! - Request path exclusion and response logging
//! - Body truncation through the facade
//! - Error normalization and stack capture
//! - Level routing to console, error-only and combined files
//! - Log injection prevention
//! - Sink failure isolation
//! - Thread safety

use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::{json, Value};
use service_logger::core::transport::{COMBINED_LOG_FILE, ERROR_LOG_FILE};
use service_logger::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tempfile::TempDir;

fn memory_logger(config: LoggerConfig, request_config: RequestLoggingConfig) -> (Logger, MemoryAppender) {
    let memory = MemoryAppender::new();
    let logger = Logger::builder()
        .config(config.with_console(false))
        .request_config(request_config)
        .appender(memory.clone(), LogLevel::Debug)
        .build()
        .expect("Failed to build logger");
    (logger, memory)
}

fn read_json_lines(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("Failed to read log file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Each line should be JSON"))
        .collect()
}

#[test]
fn test_redaction_scenario() {
    let (logger, memory) = memory_logger(
        LoggerConfig::new().with_redacted_fields(["password", "token"]),
        RequestLoggingConfig::new(),
    );

    let meta = LogMeta::new().with_field("user", json!({ "name": "a", "password": "secret" }));
    logger.info("profile updated", Some(meta));

    let record = &memory.records()[0];
    assert_eq!(
        record.get("metadata").unwrap()["user"],
        json!({ "name": "a", "password": "[REDACTED]" })
    );
}

#[test]
fn test_redaction_is_case_insensitive_and_deep() {
    let (logger, memory) = memory_logger(LoggerConfig::new(), RequestLoggingConfig::new());

    let meta = LogMeta::from_value(json!({
        "items": [{ "TOKEN": "t1" }, { "AccessToken": "t2", "sku": "A-1" }],
        "nested": { "deeper": { "Authorization": "Bearer x" } },
    }));
    logger.info("batch", Some(meta));

    let metadata = memory.records()[0].get("metadata").cloned().unwrap();
    assert_eq!(metadata["items"][0]["TOKEN"], REDACTED);
    assert_eq!(metadata["items"][1]["AccessToken"], REDACTED);
    assert_eq!(metadata["items"][1]["sku"], "A-1");
    assert_eq!(metadata["nested"]["deeper"]["Authorization"], REDACTED);
}

#[test]
fn test_excluded_path_scenario() {
    let (logger, memory) = memory_logger(
        LoggerConfig::new(),
        RequestLoggingConfig::new().with_exclude_paths(["/health"]),
    );

    let health: HttpRequest = HttpRequest::new(Method::GET, "/health".parse().unwrap());
    logger.log_request(&health, None).unwrap();
    assert!(memory.is_empty());

    // Exact match only
    let nested: HttpRequest = HttpRequest::new(Method::GET, "/health/db".parse().unwrap());
    logger.log_request(&nested, None).unwrap();

    let status: HttpRequest = HttpRequest::new(Method::GET, "/status".parse().unwrap());
    logger.log_request(&status, None).unwrap();

    assert_eq!(memory.messages(), vec!["Incoming request", "Incoming request"]);
}

#[test]
fn test_request_view_shape() {
    let (logger, memory) = memory_logger(LoggerConfig::new(), RequestLoggingConfig::new());

    let mut headers = HeaderMap::new();
    headers.insert("user-agent", HeaderValue::from_static("integration/1.0"));
    headers.insert("cookie", HeaderValue::from_static("session=abc"));
    let request = HttpRequest::new(Method::PUT, "/orders/42?notify=true".parse().unwrap())
        .with_headers(headers)
        .with_param("id", "42")
        .with_body(json!({ "status": "shipped" }));

    logger.log_request(&request, Some("corr-42")).unwrap();

    let record = &memory.records()[0];
    assert_eq!(record.get("correlationId"), Some(&json!("corr-42")));
    assert_eq!(record.level(), LogLevel::Info);

    let view = record.get("request").unwrap();
    assert_eq!(view["method"], "PUT");
    assert_eq!(view["url"], "/orders/42?notify=true");
    assert_eq!(view["headers"]["user-agent"], "integration/1.0");
    assert!(view["headers"].get("cookie").is_none());
    assert_eq!(view["params"]["id"], "42");
    assert_eq!(view["query"]["notify"], "true");
    assert_eq!(view["body"]["status"], "shipped");
}

#[test]
fn test_truncation_scenario() {
    let (logger, memory) = memory_logger(
        LoggerConfig::new(),
        RequestLoggingConfig::new().with_max_body_length(10),
    );

    let request = HttpRequest::new(Method::POST, "/upload".parse().unwrap())
        .with_body("twenty characters!!!".to_string());
    logger.log_request(&request, None).unwrap();

    let body = memory.records()[0].get("request").unwrap()["body"].clone();
    assert_eq!(body["_truncated"], true);
    assert_eq!(body["preview"].as_str().unwrap().chars().count(), 13);
    assert!(body["preview"].as_str().unwrap().ends_with("..."));
}

#[test]
fn test_response_logging() {
    let (logger, memory) = memory_logger(
        LoggerConfig::new(),
        RequestLoggingConfig::new().with_bodies(true, true),
    );

    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    let response = HttpResponse::new(StatusCode::NOT_FOUND)
        .with_headers(headers)
        .with_captured_body(json!({ "error": "not found", "token": "leak" }));

    logger.log_response(&response, Some(Instant::now()), Some("corr-1")).unwrap();

    let record = &memory.records()[0];
    assert_eq!(record.message(), "Outgoing response");
    let view = record.get("response").unwrap();
    assert_eq!(view["statusCode"], 404);
    assert_eq!(view["headers"]["content-type"], "application/json");
    assert!(view["durationMs"].is_u64());
    assert_eq!(view["body"]["token"], REDACTED);
}

#[test]
fn test_error_stack_follows_config() {
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config file missing");

    let (logger, memory) = memory_logger(LoggerConfig::new().with_stack(true), RequestLoggingConfig::new());
    logger.error("startup failed", Some(ErrorInfo::from_error(&err)), None);
    let error = memory.records()[0].get("error").cloned().unwrap();
    assert!(error["name"].as_str().unwrap().contains("Error"));
    assert_eq!(error["message"], "config file missing");
    assert!(error.get("stack").is_some());

    let (logger, memory) = memory_logger(LoggerConfig::new().with_stack(false), RequestLoggingConfig::new());
    logger.error("startup failed", Some(ErrorInfo::from_error(&err)), None);
    let error = memory.records()[0].get("error").cloned().unwrap();
    assert_eq!(error["message"], "config file missing");
    assert!(error.get("stack").is_none());
}

#[test]
fn test_level_routing_to_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let logger = Logger::new(
        LoggerConfig::new()
            .with_console(false)
            .with_level(LogLevel::Info)
            .with_log_dir(temp_dir.path()),
        RequestLoggingConfig::new(),
    )
    .expect("Failed to create logger");

    logger.debug("below threshold", None);
    logger.info("service started", None);
    logger.warn("cache cold", None);
    logger.error("database unreachable", None, None);
    logger.flush().expect("Failed to flush");

    let combined = read_json_lines(&temp_dir.path().join(COMBINED_LOG_FILE));
    let messages: Vec<&str> = combined.iter().map(|r| r["message"].as_str().unwrap()).collect();
    assert_eq!(messages, vec!["service started", "cache cold", "database unreachable"]);

    let errors = read_json_lines(&temp_dir.path().join(ERROR_LOG_FILE));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["level"], "error");
    assert_eq!(errors[0]["message"], "database unreachable");
}

#[test]
fn test_drop_flushes_files() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    {
        let logger = Logger::new(
            LoggerConfig::new().with_console(false).with_log_dir(temp_dir.path()),
            RequestLoggingConfig::new(),
        )
        .expect("Failed to create logger");
        logger.info("written before drop", None);
    }

    let combined = read_json_lines(&temp_dir.path().join(COMBINED_LOG_FILE));
    assert_eq!(combined[0]["message"], "written before drop");
}

#[test]
fn test_log_injection_prevention() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::new(
        LoggerConfig::new().with_console(false).with_log_dir(temp_dir.path()),
        RequestLoggingConfig::new(),
    )
    .expect("Failed to create logger");

    logger.info("User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation", None);
    logger.flush().expect("Failed to flush");

    let lines = read_json_lines(&temp_dir.path().join(COMBINED_LOG_FILE));
    assert_eq!(lines.len(), 1, "Log should be a single line, not multiple");
    assert_eq!(
        lines[0]["message"],
        "User login\nERROR [2024-10-17] Fake error injected\nINFO Continuation"
    );
}

#[test]
fn test_service_and_context_injection() {
    let (logger, memory) = memory_logger(
        LoggerConfig::new().with_service_name("checkout").with_metadata(true),
        RequestLoggingConfig::new(),
    );

    logger.info("tick", None);
    logger.info("tock", Some(LogMeta::new().with_service("billing")));

    let records = memory.records();
    assert_eq!(records[0].get("service"), Some(&json!("checkout")));
    assert_eq!(records[1].get("service"), Some(&json!("billing")));

    let context = records[0].get("context").unwrap();
    assert_eq!(context["pid"], std::process::id());
    assert!(context["hostname"].is_string());
}

#[test]
fn test_failing_appender_does_not_block_others() {
    struct FailingAppender;

    impl Appender for FailingAppender {
        fn append(&mut self, _record: &LogRecord) -> Result<()> {
            Err(LoggerError::other("Simulated failure"))
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    let memory = MemoryAppender::new();
    let logger = Logger::builder()
        .config(LoggerConfig::new().with_console(false))
        .appender(FailingAppender, LogLevel::Debug)
        .appender(memory.clone(), LogLevel::Debug)
        .build()
        .expect("Failed to build logger");

    logger.warn("still delivered", None);
    assert_eq!(memory.messages(), vec!["still delivered"]);
}

#[test]
fn test_unwritable_log_dir_fails_at_startup() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let result = Logger::new(
        LoggerConfig::new().with_console(false).with_log_dir(blocker.join("logs")),
        RequestLoggingConfig::new(),
    );
    assert!(result.is_err());
}

#[test]
fn test_from_settings() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path().to_str().unwrap().to_string();

    let settings = LoggingSettings::from_lookup(|key| match key {
        "LOG_LEVEL" => Some("warn".to_string()),
        "APP_ENV" => Some("production".to_string()),
        "LOG_DIR" => Some(dir.clone()),
        "LOG_CONSOLE" => Some("false".to_string()),
        "LOG_EXCLUDE_PATHS" => Some("/health,/ready".to_string()),
        _ => None,
    });

    let logger = Logger::from_settings(&settings).expect("Settings should be valid");
    assert_eq!(logger.config().level, LogLevel::Warn);
    assert!(!logger.config().pretty_print);
    assert!(logger.request_config().is_excluded("/ready"));
    assert_eq!(logger.sink_names(), vec![ERROR_LOG_FILE, COMBINED_LOG_FILE]);
}

#[test]
fn test_concurrent_logging() {
    let (logger, memory) = memory_logger(LoggerConfig::new(), RequestLoggingConfig::new());
    let logger = Arc::new(logger);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..25 {
                    logger.info(format!("thread {} message {}", t, i), None);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(memory.len(), 100);
}
