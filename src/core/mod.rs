//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod entry_builder;
pub mod error;
pub mod http_capture;
pub mod log_entry;
pub mod log_level;
pub mod log_meta;
pub mod logger;
pub mod pipeline;
pub mod redaction;
pub mod runtime_context;
pub mod timestamp;
pub mod transport;
pub mod truncation;

pub use appender::Appender;
pub use config::{Environment, LoggerConfig, LoggingSettings, RequestLoggingConfig};
pub use entry_builder::EntryBuilder;
pub use error::{LoggerError, Result, ValidationError};
pub use http_capture::{HttpRequest, HttpResponse, RequestCapture, CORRELATION_ID_HEADER};
pub use log_entry::{ErrorInfo, LogEntry, RequestView, ResponseView, UserInfo};
pub use log_level::LogLevel;
pub use log_meta::LogMeta;
pub use logger::{Logger, LoggerBuilder, INCOMING_REQUEST, OUTGOING_RESPONSE};
pub use pipeline::{FormatPipeline, LogRecord};
pub use redaction::{Redactor, MAX_REDACTION_DEPTH, REDACTED};
pub use runtime_context::RuntimeContext;
pub use timestamp::TimestampFormat;
pub use transport::{Transport, COMBINED_LOG_FILE, ERROR_LOG_FILE};
pub use truncation::{truncate_body, TRUNCATION_SUFFIX};
