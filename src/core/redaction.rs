//! Sensitive field redaction
//!
//! Field names are matched case-insensitively at every nesting level.
//! Traversal stops at [`MAX_REDACTION_DEPTH`]; anything nested deeper is
//! left as it is.

use serde_json::Value;
use std::collections::HashSet;

/// Placeholder written over sensitive values
pub const REDACTED: &str = "[REDACTED]";

/// Deepest nesting level that is still examined
pub const MAX_REDACTION_DEPTH: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct Redactor {
    /// Lowercased field names
    fields: HashSet<String>,
}

impl Redactor {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_sensitive(&self, key: &str) -> bool {
        self.fields.contains(&key.to_lowercase())
    }

    /// Scrub `value` in place
    ///
    /// The top-level object is depth 0. Arrays are walked like objects
    /// keyed by index, so only objects inside them can match.
    pub fn redact(&self, value: &mut Value) {
        if self.fields.is_empty() {
            return;
        }
        self.redact_at(value, 0);
    }

    /// Scrub a copy and return it, leaving the input untouched
    #[must_use]
    pub fn redacted(&self, value: &Value) -> Value {
        let mut copy = value.clone();
        self.redact(&mut copy);
        copy
    }

    fn redact_at(&self, value: &mut Value, depth: usize) {
        if depth > MAX_REDACTION_DEPTH {
            return;
        }

        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if self.is_sensitive(key) {
                        *val = Value::String(REDACTED.to_string());
                    } else {
                        self.redact_at(val, depth + 1);
                    }
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.redact_at(item, depth + 1);
                }
            }
            _ => {}
        }
    }
}
