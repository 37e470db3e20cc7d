//! File sink writing one JSON record per line, with rotation
//!
//! When a file is rotated it becomes `<name>.1`, any older backups shift up
//! by one, and backups past the configured count are deleted. Rotated files
//! can optionally be gzip-compressed to `<name>.N.gz`.

use crate::core::appender::Appender;
use crate::core::error::{LoggerError, Result};
use crate::core::pipeline::LogRecord;
use chrono::{DateTime, Local, Timelike};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MAX_DELETION_FAILURES: usize = 5;

/// When to rotate the active file
#[derive(Debug, Clone, PartialEq)]
pub enum RotationStrategy {
    /// Rotate once the file reaches `max_bytes`
    Size { max_bytes: u64 },

    /// Rotate on the first write of a new local day at or after `hour`
    Daily { hour: u8 },

    /// Rotate once an hour has passed since the last rotation
    Hourly,

    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Size {
            max_bytes: crate::core::config::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl RotationStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationStrategy::Size { max_bytes }
    }

    /// # Panics
    ///
    /// Panics if hour is greater than 23
    #[must_use]
    pub fn daily(hour: u8) -> Self {
        assert!(hour <= 23, "Hour must be between 0 and 23");
        RotationStrategy::Daily { hour }
    }

    #[must_use]
    pub fn hourly() -> Self {
        RotationStrategy::Hourly
    }

    #[must_use]
    pub fn never() -> Self {
        RotationStrategy::Never
    }
}

/// Rotation settings for a [`RotatingFileAppender`]
///
/// ```
/// use service_logger::appenders::{RotationPolicy, RotationStrategy};
///
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::Daily { hour: 2 })
///     .with_max_backups(30)
///     .with_compression(true);
/// assert_eq!(policy.max_file_size(), None);
/// ```
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    pub strategy: RotationStrategy,
    /// Number of rotated files kept next to the active one
    pub max_backup_files: usize,
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            max_backup_files: crate::core::config::DEFAULT_MAX_FILES,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Shorthand for `with_strategy(RotationStrategy::Size { max_bytes: size })`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.strategy = RotationStrategy::Size { max_bytes: size };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use]
    pub fn max_file_size(&self) -> Option<u64> {
        match &self.strategy {
            RotationStrategy::Size { max_bytes } => Some(*max_bytes),
            _ => None,
        }
    }
}

pub struct RotatingFileAppender {
    base_path: PathBuf,
    name: String,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    last_rotation: SystemTime,
    /// Consecutive failures to delete the oldest backup
    deletion_failure_count: usize,
}

impl RotatingFileAppender {
    /// Open `path` for appending with the default policy
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_policy(path, RotationPolicy::default())
    }

    /// # Errors
    ///
    /// Returns error if file cannot be created or opened
    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, last_rotation) = Self::open(&base_path)?;
        let name = base_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file")
            .to_string();

        Ok(Self {
            base_path,
            name,
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            last_rotation,
            deletion_failure_count: 0,
        })
    }

    fn open(path: &Path) -> Result<(File, u64, SystemTime)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        let last_rotation = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        Ok((file, metadata.len(), last_rotation))
    }

    fn should_rotate(&self) -> bool {
        match &self.policy.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size { max_bytes } => self.current_size >= *max_bytes,
            RotationStrategy::Daily { hour } => {
                let now: DateTime<Local> = SystemTime::now().into();
                let last: DateTime<Local> = self.last_rotation.into();
                now.date_naive() != last.date_naive() && now.hour() >= u32::from(*hour)
            }
            RotationStrategy::Hourly => SystemTime::now()
                .duration_since(self.last_rotation)
                .map(|elapsed| elapsed >= Duration::from_secs(3600))
                .unwrap_or(false),
        }
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        self.remove_oldest_backup()?;

        for i in (1..self.policy.max_backup_files).rev() {
            for (from, to) in [
                (self.backup_path(i), self.backup_path(i + 1)),
                (self.compressed_path(i), self.compressed_path(i + 1)),
            ] {
                if from.exists() {
                    fs::rename(&from, &to).map_err(|e| {
                        LoggerError::file_rotation(
                            from.display().to_string(),
                            format!("Failed to rotate backup files: {}", e),
                        )
                    })?;
                }
            }
        }

        if self.policy.max_backup_files > 0 && self.base_path.exists() {
            let backup = self.backup_path(1);
            fs::rename(&self.base_path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                self.compress_file(&backup, &self.compressed_path(1))?;
            }
        } else if self.base_path.exists() {
            fs::remove_file(&self.base_path)?;
        }

        let (file, _, _) = Self::open(&self.base_path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = 0;
        self.last_rotation = SystemTime::now();
        Ok(())
    }

    /// Drop the backup that would fall past `max_backup_files`
    ///
    /// Repeated failures abort the rotation so disk usage cannot grow
    /// without bound.
    fn remove_oldest_backup(&mut self) -> Result<()> {
        let index = self.policy.max_backup_files.max(1);
        let mut deletion_failed = false;

        for oldest in [self.backup_path(index), self.compressed_path(index)] {
            if !oldest.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(&oldest) {
                deletion_failed = true;
                eprintln!(
                    "[WARN] Failed to remove oldest backup {}: {} (failure #{}/{})",
                    oldest.display(),
                    e,
                    self.deletion_failure_count + 1,
                    MAX_DELETION_FAILURES
                );
            }
        }

        if !deletion_failed {
            self.deletion_failure_count = 0;
            return Ok(());
        }

        self.deletion_failure_count += 1;
        if self.deletion_failure_count >= MAX_DELETION_FAILURES {
            return Err(LoggerError::file_rotation(
                self.base_path.display().to_string(),
                format!(
                    "Rotation aborted: failed to delete old backup files {} consecutive times",
                    self.deletion_failure_count
                ),
            ));
        }
        Ok(())
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.base_path.with_file_name(format!("{}.{}", self.name, index))
    }

    fn compressed_path(&self, index: usize) -> PathBuf {
        self.base_path.with_file_name(format!("{}.{}.gz", self.name, index))
    }

    /// Stream `path` into `gz_path`, removing the original only on success
    fn compress_file(&self, path: &Path, gz_path: &Path) -> Result<()> {
        use flate2::{write::GzEncoder, Compression};
        use std::io::{self, BufReader};

        let mut temp_name = gz_path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let compress = || -> io::Result<()> {
            let mut reader = BufReader::with_capacity(64 * 1024, File::open(path)?);
            let output = BufWriter::with_capacity(64 * 1024, File::create(&temp_path)?);
            let mut encoder = GzEncoder::new(output, Compression::default());
            io::copy(&mut reader, &mut encoder)?;
            encoder.finish()?.flush()?;
            fs::rename(&temp_path, gz_path)
        };

        if let Err(e) = compress() {
            let _ = fs::remove_file(&temp_path);
            return Err(LoggerError::io_operation(
                "compress log file",
                format!("Failed to compress '{}'", path.display()),
                e,
            ));
        }

        if let Err(e) = fs::remove_file(path) {
            eprintln!(
                "[WARN] Compression succeeded but failed to remove original file {}: {}",
                path.display(),
                e
            );
        }
        Ok(())
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl Appender for RotatingFileAppender {
    fn name(&self) -> &str {
        &self.name
    }

    fn append(&mut self, record: &LogRecord) -> Result<()> {
        if self.should_rotate() {
            if let Err(e) = self.rotate() {
                eprintln!("[WARN] Log rotation failed: {}. Continuing with current file.", e);

                if self.writer.is_none() {
                    let (file, _, last_rotation) = Self::open(&self.base_path)?;
                    self.writer = Some(BufWriter::new(file));
                    self.last_rotation = last_rotation;
                }
                // Let the file outgrow the limit rather than retry on every write
                self.current_size = 0;
            }
        }

        let mut line = record.to_json()?;
        line.push('\n');

        let writer = self.writer.as_mut().ok_or_else(|| {
            LoggerError::file_appender(self.base_path.display().to_string(), "Writer not initialized")
        })?;
        writer.write_all(line.as_bytes()).map_err(|e| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += line.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }
}

impl Drop for RotatingFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}
