//! Body truncation for captured payloads

use super::error::Result;
use serde::Serialize;
use serde_json::{json, Value};

pub const TRUNCATION_SUFFIX: &str = "...";

/// Bound a body to `max_length` characters of its serialized form
///
/// String bodies are measured as-is; anything else is measured as compact
/// JSON. Bodies within the limit come back unchanged. Longer ones are
/// replaced by `{"_truncated": true, "preview": <first max_length chars>...}`.
///
/// Serialization failures are returned to the caller.
pub fn truncate_body<T>(body: &T, max_length: usize) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(body)?;
    let serialized = match &value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other)?,
    };

    if serialized.chars().count() <= max_length {
        return Ok(value);
    }

    let mut preview: String = serialized.chars().take(max_length).collect();
    preview.push_str(TRUNCATION_SUFFIX);

    Ok(json!({
        "_truncated": true,
        "preview": preview,
    }))
}
