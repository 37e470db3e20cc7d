//! # Service Logger
//!
//! Redaction-aware structured logging for web-service backends.
//!
//! ## Features
//!
//! - **Redaction**: sensitive keys are replaced with `[REDACTED]` at any depth up to 10
//! - **Request/Response Capture**: bounded, policy-filtered views of HTTP exchanges
//! - **Body Truncation**: oversized payloads become a short preview
//! - **Fan-out**: console plus level-filtered rotating JSON-lines files
//! - **Validated Settings**: environment-derived configuration with full error lists
//!
//! ```
//! use service_logger::prelude::*;
//! use serde_json::json;
//!
//! let memory = MemoryAppender::new();
//! let logger = Logger::builder()
//!     .config(LoggerConfig::new().with_console(false))
//!     .appender(memory.clone(), LogLevel::Info)
//!     .build()
//!     .unwrap();
//!
//! let meta = LogMeta::from_value(json!({ "user": { "id": "u1" }, "token": "abc" }));
//! logger.info("signed in", Some(meta));
//!
//! let record = &memory.records()[0];
//! assert_eq!(record.get("metadata").unwrap()["token"], REDACTED);
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, MemoryAppender, RotatingFileAppender};
    pub use crate::core::{
        Appender, ErrorInfo, HttpRequest, HttpResponse, LogLevel, LogMeta, LogRecord, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, LoggingSettings, RequestLoggingConfig, Result,
        TimestampFormat, UserInfo, REDACTED,
    };
}

pub use appenders::{ConsoleAppender, MemoryAppender, RotatingFileAppender};
pub use core::{
    Appender, Environment, ErrorInfo, HttpRequest, HttpResponse, LogEntry, LogLevel, LogMeta,
    LogRecord, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggingSettings,
    RequestLoggingConfig, Result, TimestampFormat, UserInfo, ValidationError, REDACTED,
};
