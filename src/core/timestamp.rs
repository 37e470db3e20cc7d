//! Timestamp formatting for log records
//!
//! Entries capture a UTC instant when they are built; sinks render that
//! instant with the format selected in the logger configuration.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::Write;
use std::str::FromStr;

const ISO8601_PATTERN: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Check a strftime pattern without rendering it
#[must_use]
pub fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use service_logger::TimestampFormat;
///
/// let format: TimestampFormat = "rfc3339".parse().unwrap();
/// assert_eq!(format, TimestampFormat::Rfc3339);
///
/// // Anything that is not a known name is treated as a strftime pattern
/// let format: TimestampFormat = "%Y-%m-%d %H:%M:%S".parse().unwrap();
/// assert!(matches!(format, TimestampFormat::Custom(_)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 format: `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` according to this format
    ///
    /// A custom pattern chrono cannot render falls back to [`Iso8601`](Self::Iso8601).
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format(ISO8601_PATTERN).to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                match write!(out, "{}", datetime.format(format_str)) {
                    Ok(()) => out,
                    Err(_) => datetime.format(ISO8601_PATTERN).to_string(),
                }
            }
        }
    }

    /// Whether a custom strftime pattern parses cleanly; named formats always do
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            TimestampFormat::Custom(format_str) => is_valid_pattern(format_str),
            _ => true,
        }
    }

    /// Check if this is a numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::UnixMillis)
    }
}

impl FromStr for TimestampFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let format = match s.trim().to_lowercase().as_str() {
            "" | "iso8601" | "iso" => TimestampFormat::Iso8601,
            "iso8601-micros" => TimestampFormat::Iso8601Micros,
            "rfc3339" => TimestampFormat::Rfc3339,
            "unix-millis" | "epoch" => TimestampFormat::UnixMillis,
            _ => TimestampFormat::Custom(s.to_string()),
        };
        Ok(format)
    }
}
