//! In-memory sink, mainly for tests
//!
//! Clones share the same buffer, so one clone can be handed to the logger
//! while another is kept to inspect what was written.

use crate::core::{Appender, LogRecord, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryAppender {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|record| record.message().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, record: &LogRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FormatPipeline, LogEntry, LogLevel, LoggerConfig};

    #[test]
    fn test_clones_share_buffer() {
        let memory = MemoryAppender::new();
        let mut sink = memory.clone();

        let record = FormatPipeline::from_config(&LoggerConfig::new())
            .format(&LogEntry::new(LogLevel::Info, "kept"))
            .unwrap();
        sink.append(&record).unwrap();

        assert_eq!(memory.len(), 1);
        assert_eq!(memory.messages(), vec!["kept"]);

        memory.clear();
        assert!(sink.is_empty());
    }
}
