//! Logging configuration
//!
//! `LoggingSettings` is the plain record read from the environment. It is
//! checked by [`LoggingSettings::validate`], which reports every invalid
//! field at once, and then split into the two immutable configurations the
//! logger consumes: [`LoggerConfig`] and [`RequestLoggingConfig`].

use super::error::{LoggerError, Result, ValidationError};
use super::log_level::LogLevel;
use super::timestamp::{self, TimestampFormat};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_REDACTED_FIELDS: &[&str] = &[
    "password",
    "token",
    "accessToken",
    "refreshToken",
    "secret",
    "authorization",
    "cookie",
    "apiKey",
    "creditCard",
];

pub const DEFAULT_INCLUDE_HEADERS: &[&str] = &[
    "user-agent",
    "content-type",
    "content-length",
    "x-correlation-id",
];

pub const DEFAULT_EXCLUDE_PATHS: &[&str] = &["/health"];

pub const DEFAULT_MAX_BODY_LENGTH: usize = 1000;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_FILES: usize = 5;

/// Deployment environment, used to pick pretty or compact console output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Development and test runs get human-readable console output
    pub fn is_development_like(&self) -> bool {
        matches!(self, Environment::Development | Environment::Test)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "test" | "testing" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!("Invalid environment: '{}'", s)),
        }
    }
}

/// Process-wide logger configuration, immutable once the logger is built
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub pretty_print: bool,
    pub log_dir: Option<PathBuf>,
    pub console_enabled: bool,
    pub timestamp_format: TimestampFormat,
    pub include_correlation_id: bool,
    pub redacted_fields: Vec<String>,
    pub include_stack: bool,
    pub include_metadata: bool,
    pub service_name: Option<String>,
    pub max_file_size: u64,
    pub max_files: usize,
    pub compress_rotated: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            pretty_print: true,
            log_dir: None,
            console_enabled: true,
            timestamp_format: TimestampFormat::default(),
            include_correlation_id: true,
            redacted_fields: DEFAULT_REDACTED_FIELDS.iter().map(|s| s.to_string()).collect(),
            include_stack: true,
            include_metadata: true,
            service_name: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
            compress_rotated: false,
        }
    }
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console_enabled = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_correlation_id(mut self, enabled: bool) -> Self {
        self.include_correlation_id = enabled;
        self
    }

    /// Replace the redacted field list
    #[must_use = "builder methods return a new value"]
    pub fn with_redacted_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redacted_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_stack(mut self, enabled: bool) -> Self {
        self.include_stack = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_metadata(mut self, enabled: bool) -> Self {
        self.include_metadata = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_rotation(mut self, max_file_size: u64, max_files: usize) -> Self {
        self.max_file_size = max_file_size;
        self.max_files = max_files;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress_rotated = enabled;
        self
    }
}

/// Request/response capture policy, immutable once the logger is built
#[derive(Debug, Clone)]
pub struct RequestLoggingConfig {
    pub log_request_body: bool,
    pub log_response_body: bool,
    pub max_body_length: usize,
    /// Header names copied into request views, compared case-insensitively
    pub include_headers: Vec<String>,
    /// Paths whose requests are not logged, compared exactly
    pub exclude_paths: HashSet<String>,
    pub log_query_params: bool,
    pub log_route_params: bool,
    pub log_timing: bool,
}

impl Default for RequestLoggingConfig {
    fn default() -> Self {
        Self {
            log_request_body: true,
            log_response_body: false,
            max_body_length: DEFAULT_MAX_BODY_LENGTH,
            include_headers: DEFAULT_INCLUDE_HEADERS.iter().map(|s| s.to_string()).collect(),
            exclude_paths: DEFAULT_EXCLUDE_PATHS.iter().map(|s| s.to_string()).collect(),
            log_query_params: true,
            log_route_params: true,
            log_timing: true,
        }
    }
}

impl RequestLoggingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_bodies(mut self, request: bool, response: bool) -> Self {
        self.log_request_body = request;
        self.log_response_body = response;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_body_length(mut self, max: usize) -> Self {
        self.max_body_length = max;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_include_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_exclude_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_params(mut self, query: bool, route: bool) -> Self {
        self.log_query_params = query;
        self.log_route_params = route;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_timing(mut self, enabled: bool) -> Self {
        self.log_timing = enabled;
        self
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude_paths.contains(path)
    }
}

/// Raw settings as read from the environment
///
/// Every field is kept as text until [`validate`](Self::validate) succeeds,
/// so that all problems can be reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub environment: Option<String>,
    pub log_dir: Option<String>,
    pub service_name: Option<String>,
    pub pretty_print: Option<String>,
    pub console_enabled: Option<String>,
    pub timestamp_format: Option<String>,
    pub redacted_fields: Option<String>,
    pub include_stack: Option<String>,
    pub include_metadata: Option<String>,
    pub include_correlation_id: Option<String>,
    pub log_request_body: Option<String>,
    pub log_response_body: Option<String>,
    pub max_body_length: Option<String>,
    pub include_headers: Option<String>,
    pub exclude_paths: Option<String>,
    pub log_query_params: Option<String>,
    pub log_route_params: Option<String>,
    pub log_timing: Option<String>,
    pub max_file_size: Option<String>,
    pub max_files: Option<String>,
}

impl LoggingSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            level: get("LOG_LEVEL"),
            environment: get("APP_ENV"),
            log_dir: get("LOG_DIR"),
            service_name: get("LOG_SERVICE_NAME"),
            pretty_print: get("LOG_PRETTY"),
            console_enabled: get("LOG_CONSOLE"),
            timestamp_format: get("LOG_TIMESTAMP_FORMAT"),
            redacted_fields: get("LOG_REDACT_FIELDS"),
            include_stack: get("LOG_INCLUDE_STACK"),
            include_metadata: get("LOG_INCLUDE_METADATA"),
            include_correlation_id: get("LOG_CORRELATION_ID"),
            log_request_body: get("LOG_REQUEST_BODY"),
            log_response_body: get("LOG_RESPONSE_BODY"),
            max_body_length: get("LOG_MAX_BODY_LENGTH"),
            include_headers: get("LOG_INCLUDE_HEADERS"),
            exclude_paths: get("LOG_EXCLUDE_PATHS"),
            log_query_params: get("LOG_QUERY_PARAMS"),
            log_route_params: get("LOG_ROUTE_PARAMS"),
            log_timing: get("LOG_TIMING"),
            max_file_size: get("LOG_MAX_FILE_SIZE"),
            max_files: get("LOG_MAX_FILES"),
        }
    }

    /// Check every field, collecting all failures
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(level) = &self.level {
            if let Err(e) = level.parse::<LogLevel>() {
                errors.push(ValidationError::new("LOG_LEVEL", e));
            }
        }
        if let Some(env) = &self.environment {
            if let Err(e) = env.parse::<Environment>() {
                errors.push(ValidationError::new("APP_ENV", e));
            }
        }
        if let Some(format) = &self.timestamp_format {
            if !timestamp::is_valid_pattern(format) {
                errors.push(ValidationError::new(
                    "LOG_TIMESTAMP_FORMAT",
                    format!("invalid strftime pattern '{}'", format),
                ));
            }
        }

        let flags = [
            ("LOG_PRETTY", &self.pretty_print),
            ("LOG_CONSOLE", &self.console_enabled),
            ("LOG_INCLUDE_STACK", &self.include_stack),
            ("LOG_INCLUDE_METADATA", &self.include_metadata),
            ("LOG_CORRELATION_ID", &self.include_correlation_id),
            ("LOG_REQUEST_BODY", &self.log_request_body),
            ("LOG_RESPONSE_BODY", &self.log_response_body),
            ("LOG_QUERY_PARAMS", &self.log_query_params),
            ("LOG_ROUTE_PARAMS", &self.log_route_params),
            ("LOG_TIMING", &self.log_timing),
        ];
        for (field, value) in flags {
            if let Some(value) = value {
                if parse_flag(value).is_none() {
                    errors.push(ValidationError::new(
                        field,
                        format!("expected a boolean, got '{}'", value),
                    ));
                }
            }
        }

        let positives = [
            ("LOG_MAX_BODY_LENGTH", &self.max_body_length),
            ("LOG_MAX_FILE_SIZE", &self.max_file_size),
            ("LOG_MAX_FILES", &self.max_files),
        ];
        for (field, value) in positives {
            if let Some(value) = value {
                match value.trim().parse::<u64>() {
                    Ok(n) if n > 0 => {}
                    _ => errors.push(ValidationError::new(
                        field,
                        format!("must be a positive integer, got '{}'", value),
                    )),
                }
            }
        }

        if let Some(paths) = &self.exclude_paths {
            for path in split_list(paths) {
                if !path.starts_with('/') {
                    errors.push(ValidationError::new(
                        "LOG_EXCLUDE_PATHS",
                        format!("path '{}' must start with '/'", path),
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
            .as_deref()
            .and_then(|env| env.parse().ok())
            .unwrap_or_default()
    }

    /// Validate once and derive both configurations
    pub fn configs(&self) -> Result<(LoggerConfig, RequestLoggingConfig)> {
        self.validate().map_err(LoggerError::Validation)?;
        Ok((self.derive_logger_config(), self.derive_request_config()))
    }

    /// Validate and derive the logger configuration
    pub fn logger_config(&self) -> Result<LoggerConfig> {
        self.validate().map_err(LoggerError::Validation)?;
        Ok(self.derive_logger_config())
    }

    /// Validate and derive the request logging configuration
    pub fn request_config(&self) -> Result<RequestLoggingConfig> {
        self.validate().map_err(LoggerError::Validation)?;
        Ok(self.derive_request_config())
    }

    // Callers must have validated; unparsable values fall back to defaults.
    fn derive_logger_config(&self) -> LoggerConfig {
        let environment = self.environment();
        let defaults = LoggerConfig::default();

        LoggerConfig {
            level: parse_or(&self.level, defaults.level),
            pretty_print: flag_or(&self.pretty_print, environment.is_development_like()),
            log_dir: self.log_dir.as_ref().map(PathBuf::from),
            console_enabled: flag_or(&self.console_enabled, defaults.console_enabled),
            timestamp_format: parse_or(&self.timestamp_format, defaults.timestamp_format),
            include_correlation_id: flag_or(
                &self.include_correlation_id,
                defaults.include_correlation_id,
            ),
            redacted_fields: self
                .redacted_fields
                .as_deref()
                .map(|fields| split_list(fields).map(String::from).collect())
                .unwrap_or(defaults.redacted_fields),
            include_stack: flag_or(&self.include_stack, environment != Environment::Production),
            include_metadata: flag_or(&self.include_metadata, defaults.include_metadata),
            service_name: self.service_name.clone(),
            max_file_size: parse_or(&self.max_file_size, defaults.max_file_size),
            max_files: parse_or(&self.max_files, defaults.max_files),
            compress_rotated: defaults.compress_rotated,
        }
    }

    fn derive_request_config(&self) -> RequestLoggingConfig {
        let defaults = RequestLoggingConfig::default();
        RequestLoggingConfig {
            log_request_body: flag_or(&self.log_request_body, defaults.log_request_body),
            log_response_body: flag_or(&self.log_response_body, defaults.log_response_body),
            max_body_length: parse_or(&self.max_body_length, defaults.max_body_length),
            include_headers: self
                .include_headers
                .as_deref()
                .map(|headers| split_list(headers).map(str::to_lowercase).collect())
                .unwrap_or(defaults.include_headers),
            exclude_paths: self
                .exclude_paths
                .as_deref()
                .map(|paths| split_list(paths).map(String::from).collect())
                .unwrap_or(defaults.exclude_paths),
            log_query_params: flag_or(&self.log_query_params, defaults.log_query_params),
            log_route_params: flag_or(&self.log_route_params, defaults.log_route_params),
            log_timing: flag_or(&self.log_timing, defaults.log_timing),
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn flag_or(value: &Option<String>, default: bool) -> bool {
    value.as_deref().and_then(parse_flag).unwrap_or(default)
}

fn parse_or<T: FromStr>(value: &Option<String>, default: T) -> T {
    value
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
