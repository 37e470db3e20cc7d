//! Logger facade
//!
//! The only type request handlers talk to. Leveled methods build an entry
//! and hand it to the transport; level filtering happens per sink.

use super::{
    appender::Appender,
    config::{LoggerConfig, LoggingSettings, RequestLoggingConfig},
    entry_builder::EntryBuilder,
    error::{LoggerError, Result},
    http_capture::{HttpRequest, HttpResponse, RequestCapture, CORRELATION_ID_HEADER},
    log_entry::ErrorInfo,
    log_level::LogLevel,
    log_meta::LogMeta,
    transport::Transport,
};
use serde::Serialize;
use std::time::Instant;

pub const INCOMING_REQUEST: &str = "Incoming request";
pub const OUTGOING_RESPONSE: &str = "Outgoing response";

pub struct Logger {
    config: LoggerConfig,
    builder: EntryBuilder,
    capture: RequestCapture,
    transport: Transport,
}

impl Logger {
    /// Create a logger with the standard sinks for `config`
    ///
    /// # Errors
    ///
    /// Returns error if a file sink cannot be created in the log directory
    pub fn new(config: LoggerConfig, request_config: RequestLoggingConfig) -> Result<Self> {
        Self::builder()
            .config(config)
            .request_config(request_config)
            .build()
    }

    /// Validate `settings` and create a logger from them
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::Validation`](super::error::LoggerError::Validation)
    /// listing every invalid setting, or a sink initialization error
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self> {
        let (config, request_config) = settings.configs()?;
        Self::new(config, request_config)
    }

    /// Shorthand for `from_settings(&LoggingSettings::from_env())`
    pub fn from_env() -> Result<Self> {
        Self::from_settings(&LoggingSettings::from_env())
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn request_config(&self) -> &RequestLoggingConfig {
        self.capture.config()
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.transport.sink_names()
    }

    /// Whether an entry at `level` would reach at least one sink
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.transport.accepts(level)
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>, meta: LogMeta) {
        let entry = self.builder.build(level, message, meta);
        self.transport.dispatch(&entry);
    }

    pub fn debug(&self, message: impl AsRef<str>, meta: Option<LogMeta>) {
        self.log(LogLevel::Debug, message, meta.unwrap_or_default());
    }

    pub fn info(&self, message: impl AsRef<str>, meta: Option<LogMeta>) {
        self.log(LogLevel::Info, message, meta.unwrap_or_default());
    }

    pub fn warn(&self, message: impl AsRef<str>, meta: Option<LogMeta>) {
        self.log(LogLevel::Warn, message, meta.unwrap_or_default());
    }

    /// Log at error level; `error` takes precedence over an error in `meta`
    pub fn error(&self, message: impl AsRef<str>, error: Option<ErrorInfo>, meta: Option<LogMeta>) {
        let mut meta = meta.unwrap_or_default();
        if let Some(error) = error {
            meta.error = Some(error);
        }
        self.log(LogLevel::Error, message, meta);
    }

    /// Log an inbound request at info level
    ///
    /// Requests on an excluded path produce nothing. Without an explicit
    /// correlation id the `x-correlation-id` header is used, if present.
    ///
    /// # Errors
    ///
    /// Returns error if the request body cannot be serialized
    pub fn log_request<B: Serialize>(
        &self,
        request: &HttpRequest<B>,
        correlation_id: Option<&str>,
    ) -> Result<()> {
        if self.capture.is_excluded(request) {
            return Ok(());
        }

        let view = self.capture.capture_request(request)?;
        let mut meta = LogMeta::new().with_request(view);
        if let Some(id) = correlation_id.or_else(|| request.header(CORRELATION_ID_HEADER)) {
            meta = meta.with_correlation_id(id);
        }

        self.info(INCOMING_REQUEST, Some(meta));
        Ok(())
    }

    /// Log an outgoing response at info level
    ///
    /// Unlike [`log_request`](Self::log_request) there is no path exclusion.
    ///
    /// # Errors
    ///
    /// Returns error if the captured body cannot be serialized
    pub fn log_response<B: Serialize>(
        &self,
        response: &HttpResponse<B>,
        started_at: Option<Instant>,
        correlation_id: Option<&str>,
    ) -> Result<()> {
        let view = self.capture.capture_response(response, started_at)?;
        let mut meta = LogMeta::new().with_response(view);
        if let Some(id) = correlation_id {
            meta = meta.with_correlation_id(id);
        }

        self.info(OUTGOING_RESPONSE, Some(meta));
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.transport.flush()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.transport.flush() {
            eprintln!("[LOGGER WARNING] Failed to flush on drop: {}", e);
        }
    }
}

/// Builder for [`Logger`]
///
/// # Example
/// ```
/// use service_logger::prelude::*;
///
/// let memory = MemoryAppender::new();
/// let logger = Logger::builder()
///     .config(LoggerConfig::new().with_console(false))
///     .appender(memory.clone(), LogLevel::Warn)
///     .build()
///     .unwrap();
///
/// logger.info("ignored", None);
/// logger.warn("kept", None);
/// assert_eq!(memory.messages(), vec!["kept"]);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    request_config: RequestLoggingConfig,
    appenders: Vec<(Box<dyn Appender>, LogLevel)>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            request_config: RequestLoggingConfig::default(),
            appenders: Vec::new(),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn request_config(mut self, config: RequestLoggingConfig) -> Self {
        self.request_config = config;
        self
    }

    /// Attach an extra sink with its own minimum level
    ///
    /// The effective minimum is never below the configured logger level.
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A, min_level: LogLevel) -> Self {
        self.appenders.push((Box::new(appender), min_level));
        self
    }

    /// # Errors
    ///
    /// Returns error if the timestamp pattern is invalid or a file sink
    /// cannot be created
    pub fn build(self) -> Result<Logger> {
        if !self.config.timestamp_format.is_valid() {
            return Err(LoggerError::config(
                "timestamp_format",
                format!("invalid strftime pattern {:?}", self.config.timestamp_format),
            ));
        }

        let mut transport = Transport::from_config(&self.config)?;
        for (appender, min_level) in self.appenders {
            transport.add_sink(appender, min_level.max(self.config.level));
        }

        Ok(Logger {
            builder: EntryBuilder::from_config(&self.config),
            capture: RequestCapture::new(self.request_config),
            transport,
            config: self.config,
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
