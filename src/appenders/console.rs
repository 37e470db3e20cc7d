//! Console sink
//!
//! Pretty mode prints a colored `[timestamp] LEVEL message` line followed by
//! the remaining fields as indented JSON. Compact mode prints each record as
//! a single JSON line. Errors go to stderr, everything else to stdout.

use crate::core::{Appender, LogLevel, LogRecord, Result};
use colored::Colorize;

pub struct ConsoleAppender {
    pretty: bool,
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new(pretty: bool) -> Self {
        Self {
            pretty,
            use_colors: true,
        }
    }

    /// Human-readable output for local development
    pub fn pretty() -> Self {
        Self::new(true)
    }

    /// One JSON object per line
    pub fn compact() -> Self {
        Self::new(false)
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Render a record exactly as it will be printed
    pub fn format_record(&self, record: &LogRecord) -> Result<String> {
        if !self.pretty {
            return Ok(record.to_json()?);
        }

        let level = format!("{:5}", record.level().to_str().to_uppercase());
        let level = if self.use_colors {
            level.color(record.level().color_code()).to_string()
        } else {
            level
        };

        let mut output = format!(
            "[{}] {} {}",
            record.timestamp(),
            level,
            sanitize_message(record.message())
        );

        let extra = record.extra_fields();
        if !extra.is_empty() {
            output.push('\n');
            output.push_str(&serde_json::to_string_pretty(&extra)?);
        }

        Ok(output)
    }
}

/// Escape line breaks and tabs so one entry stays on one header line
fn sanitize_message(message: &str) -> String {
    message
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::compact()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        let output = self.format_record(record)?;

        match record.level() {
            LogLevel::Error => eprintln!("{}", output),
            _ => println!("{}", output),
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        use std::io::Write;
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
