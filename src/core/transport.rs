//! Fan-out of finished entries to sinks
//!
//! Every sink has its own minimum level. An entry is formatted once by the
//! shared [`FormatPipeline`] and handed to each sink whose level admits it.

use super::{
    appender::Appender,
    config::LoggerConfig,
    error::{LoggerError, Result},
    log_entry::LogEntry,
    log_level::LogLevel,
    pipeline::FormatPipeline,
};
use crate::appenders::{ConsoleAppender, RotatingFileAppender, RotationPolicy};
use parking_lot::RwLock;
use std::fs;

pub const ERROR_LOG_FILE: &str = "error.log";
pub const COMBINED_LOG_FILE: &str = "combined.log";

struct Sink {
    appender: Box<dyn Appender>,
    min_level: LogLevel,
}

pub struct Transport {
    pipeline: FormatPipeline,
    sinks: RwLock<Vec<Sink>>,
}

impl Transport {
    /// Create a transport with no sinks
    pub fn new(pipeline: FormatPipeline) -> Self {
        Self {
            pipeline,
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// Create the standard sinks described by `config`
    ///
    /// Console (if enabled) at the configured level, pretty or compact.
    /// With a log directory: `error.log` for errors only and `combined.log`
    /// at the configured level. Failing to create either file is an error.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        let mut transport = Self::new(FormatPipeline::from_config(config));

        if config.console_enabled {
            transport.add_sink(
                Box::new(ConsoleAppender::new(config.pretty_print)),
                config.level,
            );
        }

        if let Some(dir) = &config.log_dir {
            fs::create_dir_all(dir).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", dir.display()),
                    e,
                )
            })?;

            let policy = RotationPolicy::new()
                .with_max_size(config.max_file_size)
                .with_max_backups(config.max_files)
                .with_compression(config.compress_rotated);

            let errors = RotatingFileAppender::with_policy(dir.join(ERROR_LOG_FILE), policy.clone())?;
            transport.add_sink(Box::new(errors), LogLevel::Error);

            let combined = RotatingFileAppender::with_policy(dir.join(COMBINED_LOG_FILE), policy)?;
            transport.add_sink(Box::new(combined), config.level);
        }

        Ok(transport)
    }

    pub fn add_sink(&mut self, appender: Box<dyn Appender>, min_level: LogLevel) {
        self.sinks.get_mut().push(Sink {
            appender,
            min_level,
        });
    }

    pub fn pipeline(&self) -> &FormatPipeline {
        &self.pipeline
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks
            .read()
            .iter()
            .map(|sink| sink.appender.name().to_string())
            .collect()
    }

    /// Whether any sink would take an entry at `level`
    pub fn accepts(&self, level: LogLevel) -> bool {
        self.sinks.read().iter().any(|sink| level >= sink.min_level)
    }

    /// Deliver an entry to every sink that admits its level
    ///
    /// Returns the number of sinks that wrote it. A failing or panicking
    /// sink is reported on stderr and does not stop the others.
    pub fn dispatch(&self, entry: &LogEntry) -> usize {
        if !self.accepts(entry.level) {
            return 0;
        }

        let record = match self.pipeline.format(entry) {
            Ok(record) => record,
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to format log entry: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        let mut sinks = self.sinks.write();

        for (idx, sink) in sinks.iter_mut().enumerate() {
            if entry.level < sink.min_level {
                continue;
            }

            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                sink.appender.append(&record)
            }));

            match append_result {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    eprintln!(
                        "[LOGGER ERROR] Appender #{} ({}) failed: {}",
                        idx,
                        sink.appender.name(),
                        e
                    );
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx, panic_msg
                    );
                }
            }
        }

        delivered
    }

    pub fn flush(&self) -> Result<()> {
        let mut sinks = self.sinks.write();
        for sink in sinks.iter_mut() {
            sink.appender.flush()?;
        }
        Ok(())
    }
}
