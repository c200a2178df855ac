//! Decide which dialect an inbound body is written in.
//!
//! The test is structural: it looks only at whether the Responses-only fields
//! are present, never at their contents.

use serde_json::{Map, Value};

use super::legacy_types::LegacyRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Legacy,
    Target,
}

impl Dialect {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Target => "target",
        }
    }
}

/// A request body after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundRequest {
    Legacy(LegacyRequest),
    /// Already in Responses shape; forwarded untouched.
    Target(Value),
}

impl InboundRequest {
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Legacy(_) => Dialect::Legacy,
            Self::Target(_) => Dialect::Target,
        }
    }
}

/// True when any of these hold: `input` is an array (possibly empty),
/// `output_format` is present and non-null, `text` is present and non-null.
#[must_use]
pub fn is_target_dialect(body: &Map<String, Value>) -> bool {
    matches!(body.get("input"), Some(Value::Array(_)))
        || body.get("output_format").is_some_and(|v| !v.is_null())
        || body.get("text").is_some_and(|v| !v.is_null())
}

/// Classify a parsed body. Bodies that are not JSON objects have no fields at
/// all and are therefore legacy.
#[must_use]
pub fn classify(body: Value) -> InboundRequest {
    let Value::Object(map) = body else {
        return InboundRequest::Legacy(LegacyRequest::default());
    };

    if is_target_dialect(&map) {
        InboundRequest::Target(Value::Object(map))
    } else {
        InboundRequest::Legacy(LegacyRequest::from_map(&map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dialect_of(v: Value) -> Dialect {
        classify(v).dialect()
    }

    #[test]
    fn test_empty_input_array_is_target() {
        assert_eq!(dialect_of(json!({ "model": "x", "input": [] })), Dialect::Target);
    }

    #[test]
    fn test_messages_only_is_legacy() {
        assert_eq!(dialect_of(json!({ "model": "x", "messages": [] })), Dialect::Legacy);
    }

    #[test]
    fn test_string_input_is_not_a_marker() {
        assert_eq!(dialect_of(json!({ "input": "hello" })), Dialect::Legacy);
    }

    #[test]
    fn test_output_format_and_text_markers() {
        assert_eq!(
            dialect_of(json!({ "output_format": { "type": "json_schema" } })),
            Dialect::Target
        );
        assert_eq!(dialect_of(json!({ "text": { "format": { "type": "text" } } })), Dialect::Target);
        // Any non-null value counts, even one that is not a valid format.
        assert_eq!(dialect_of(json!({ "text": false })), Dialect::Target);
    }

    #[test]
    fn test_null_markers_are_ignored() {
        assert_eq!(
            dialect_of(json!({ "input": null, "output_format": null, "text": null })),
            Dialect::Legacy
        );
    }

    #[test]
    fn test_empty_body_is_legacy_with_no_fields() {
        match classify(json!({})) {
            InboundRequest::Legacy(req) => {
                assert_eq!(req.model, None);
                assert!(req.messages.is_empty());
            }
            other => panic!("Expected legacy, got {other:?}"),
        }
    }

    #[test]
    fn test_non_object_body_is_legacy() {
        assert_eq!(classify(json!([1, 2])), InboundRequest::Legacy(LegacyRequest::default()));
        assert_eq!(classify(Value::Null), InboundRequest::Legacy(LegacyRequest::default()));
    }

    #[test]
    fn test_target_body_is_kept_verbatim() {
        let body = json!({ "model": "x", "input": [{"role": "user"}], "extra": 1 });
        assert_eq!(classify(body.clone()), InboundRequest::Target(body));
    }
}
