//! Assembly of log entries from a message and a metadata bag

use super::config::LoggerConfig;
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::log_meta::LogMeta;
use super::runtime_context::RuntimeContext;

/// Turns `(level, message, meta)` into a [`LogEntry`]
///
/// The timestamp and the runtime context are both taken at build time.
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    include_correlation_id: bool,
    include_metadata: bool,
    include_stack: bool,
}

impl EntryBuilder {
    pub fn from_config(config: &LoggerConfig) -> Self {
        Self {
            include_correlation_id: config.include_correlation_id,
            include_metadata: config.include_metadata,
            include_stack: config.include_stack,
        }
    }

    pub fn build(&self, level: LogLevel, message: impl AsRef<str>, mut meta: LogMeta) -> LogEntry {
        let mut entry = LogEntry::new(level, message);

        if self.include_correlation_id {
            entry.correlation_id = meta.correlation_id.take();
        }
        entry.service = meta.service.take();
        entry.error = meta
            .error
            .take()
            .map(|error| error.normalized(self.include_stack));
        entry.request = meta.request.take();
        entry.response = meta.response.take();
        entry.user = meta.user.take();

        let fields = meta.into_fields();
        if !fields.is_empty() {
            entry.metadata = Some(fields);
        }

        if self.include_metadata {
            entry.context = Some(RuntimeContext::snapshot());
        }

        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_entry::{ErrorInfo, UserInfo};

    fn builder(config: LoggerConfig) -> EntryBuilder {
        EntryBuilder::from_config(&config)
    }

    #[test]
    fn test_copies_slots_verbatim() {
        let meta = LogMeta::new()
            .with_correlation_id("req-1")
            .with_user(UserInfo::new("u-9").with_email("a@example.com"))
            .with_field("orderId", 17);

        let entry = builder(LoggerConfig::new()).build(LogLevel::Info, "order placed", meta);

        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "order placed");
        assert_eq!(entry.correlation_id.as_deref(), Some("req-1"));
        assert_eq!(entry.user.unwrap().id, "u-9");
        assert_eq!(entry.metadata.unwrap()["orderId"], 17);
    }

    #[test]
    fn test_empty_meta_leaves_slots_empty() {
        let entry = builder(LoggerConfig::new().with_metadata(false))
            .build(LogLevel::Debug, "tick", LogMeta::new());

        assert!(entry.metadata.is_none());
        assert!(entry.context.is_none());
        assert!(entry.error.is_none());
    }

    #[test]
    fn test_context_follows_metadata_flag() {
        let entry = builder(LoggerConfig::new().with_metadata(true))
            .build(LogLevel::Info, "tick", LogMeta::new());

        let context = entry.context.unwrap();
        assert_eq!(context.pid, std::process::id());
    }

    #[test]
    fn test_service_from_meta() {
        let b = builder(LoggerConfig::new().with_service_name("billing"));

        let entry = b.build(LogLevel::Info, "x", LogMeta::new());
        assert!(entry.service.is_none());

        let entry = b.build(LogLevel::Info, "x", LogMeta::new().with_service("auth"));
        assert_eq!(entry.service.as_deref(), Some("auth"));
    }

    #[test]
    fn test_correlation_id_can_be_disabled() {
        let entry = builder(LoggerConfig::new().with_correlation_id(false)).build(
            LogLevel::Info,
            "x",
            LogMeta::new().with_correlation_id("req-1"),
        );
        assert!(entry.correlation_id.is_none());
    }

    #[test]
    fn test_error_stack_follows_config() {
        let meta = || LogMeta::new().with_error(ErrorInfo::new("IoError", "disk full"));

        let entry = builder(LoggerConfig::new().with_stack(true)).build(LogLevel::Error, "x", meta());
        assert!(entry.error.unwrap().stack.is_some());

        let entry = builder(LoggerConfig::new().with_stack(false)).build(LogLevel::Error, "x", meta());
        let error = entry.error.unwrap();
        assert_eq!(error.name, "IoError");
        assert_eq!(error.message, "disk full");
        assert!(error.stack.is_none());
    }
}
