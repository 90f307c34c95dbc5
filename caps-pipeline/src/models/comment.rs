//! Raw records fetched from the remote comment source

use serde_json::Value;

/// One record from the remote collection, before analysis
///
/// `body` is `None` when the remote element had no string `"body"` field;
/// such a record is malformed and is skipped by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawComment {
    /// Comment text
    pub body: Option<String>,
    /// Remote identifier (the element's `"id"`, JSON null when absent)
    pub source_identifier: Value,
}

impl RawComment {
    /// Build a well-formed comment
    pub fn new(body: impl Into<String>, source_identifier: Value) -> Self {
        Self {
            body: Some(body.into()),
            source_identifier,
        }
    }

    /// Interpret one element of the remote JSON array
    ///
    /// Never fails: missing or non-string bodies are kept as `None` so that a
    /// single bad element only costs that element.
    pub fn from_json(element: &Value) -> Self {
        Self {
            body: element
                .get("body")
                .and_then(Value::as_str)
                .map(str::to_string),
            source_identifier: element.get("id").cloned().unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_body_and_id() {
        let comment = RawComment::from_json(&json!({
            "postId": 1,
            "id": 4,
            "name": "alias odio sit",
            "email": "Lew@alysha.tv",
            "body": "non et atque"
        }));
        assert_eq!(comment.body.as_deref(), Some("non et atque"));
        assert_eq!(comment.source_identifier, json!(4));
    }

    #[test]
    fn test_from_json_missing_body() {
        let comment = RawComment::from_json(&json!({"id": 7}));
        assert!(comment.body.is_none());
        assert_eq!(comment.source_identifier, json!(7));
    }

    #[test]
    fn test_from_json_non_string_body() {
        let comment = RawComment::from_json(&json!({"id": 1, "body": 42}));
        assert!(comment.body.is_none());
    }

    #[test]
    fn test_from_json_non_object_element() {
        let comment = RawComment::from_json(&json!("just a string"));
        assert!(comment.body.is_none());
        assert_eq!(comment.source_identifier, Value::Null);
    }
}
