//! Metadata bag accepted by the logging methods
//!
//! Known slots are typed; everything else goes into an open JSON map.

use super::log_entry::{ErrorInfo, RequestView, ResponseView, UserInfo};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct LogMeta {
    pub correlation_id: Option<String>,
    pub service: Option<String>,
    pub error: Option<ErrorInfo>,
    pub request: Option<RequestView>,
    pub response: Option<ResponseView>,
    pub user: Option<UserInfo>,
    fields: Map<String, Value>,
}

impl LogMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an untyped JSON bag
    ///
    /// `correlationId`, `service`, `error`, `request`, `response` and `user`
    /// are lifted into their typed slots; everything else becomes a free-form field. Slots whose
    /// shape does not match are dropped, as is a non-object bag.
    pub fn from_value(value: Value) -> Self {
        let mut meta = Self::new();
        let Value::Object(map) = value else {
            return meta;
        };

        for (key, val) in map {
            match key.as_str() {
                "correlationId" => meta.correlation_id = val.as_str().map(String::from),
                "service" => meta.service = val.as_str().map(String::from),
                "error" => meta.error = serde_json::from_value(val).ok(),
                "request" => meta.request = serde_json::from_value(val).ok(),
                "response" => meta.response = serde_json::from_value(val).ok(),
                "user" => meta.user = serde_json::from_value(val).ok(),
                _ => {
                    meta.fields.insert(key, val);
                }
            }
        }
        meta
    }

    #[must_use]
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn with_request(mut self, request: RequestView) -> Self {
        self.request = Some(request);
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: ResponseView) -> Self {
        self.response = Some(response);
        self
    }

    /// Add a free-form field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a free-form field from any serializable value
    ///
    /// A value that fails to serialize is left out.
    #[must_use]
    pub fn with_serialized<T>(mut self, key: impl Into<String>, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        if let Ok(value) = serde_json::to_value(value) {
            self.fields.insert(key.into(), value);
        }
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub(crate) fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_from_value_lifts_known_slots() {
        let meta = LogMeta::from_value(json!({
            "correlationId": "abc",
            "user": { "id": "u1", "roles": ["admin"] },
            "orderId": 42,
        }));

        assert_eq!(meta.correlation_id.as_deref(), Some("abc"));
        assert_eq!(meta.user.unwrap().roles, vec!["admin"]);
        assert_eq!(meta.fields["orderId"], 42);
    }

    #[test]
    fn test_from_value_lifts_request_and_response() {
        let meta = LogMeta::from_value(json!({
            "request": { "method": "GET", "url": "/orders?page=2", "query": { "page": "2" } },
            "response": { "statusCode": 404, "durationMs": 12 },
        }));

        let request = meta.request.as_ref().unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.query.as_ref().unwrap()["page"], "2");
        let response = meta.response.as_ref().unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.duration_ms, Some(12));
        assert!(meta.fields().is_empty());

        let meta = LogMeta::from_value(json!({ "response": { "status": "bad" } }));
        assert!(meta.response.is_none());
    }

    #[test]
    fn test_from_value_drops_malformed_slots() {
        let meta = LogMeta::from_value(json!({ "user": "not-an-object", "correlationId": 5 }));
        assert!(meta.user.is_none());
        assert!(meta.correlation_id.is_none());
        assert!(meta.fields().is_empty());
    }

    #[test]
    fn test_from_non_object_is_empty() {
        let meta = LogMeta::from_value(json!(["a", "b"]));
        assert!(meta.fields().is_empty());
        assert!(meta.error.is_none());
    }

    #[test]
    fn test_with_serialized_skips_failures() {
        let mut bad = HashMap::new();
        bad.insert((1, 1), "x");

        let meta = LogMeta::new()
            .with_serialized("ok", &vec![1, 2])
            .with_serialized("bad", &bad);

        assert_eq!(meta.fields()["ok"], json!([1, 2]));
        assert!(!meta.fields().contains_key("bad"));
    }
}
