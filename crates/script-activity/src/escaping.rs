//! Input escaping policy
//!
//! Each input port declares how its value's textual form is encoded
//! before it becomes a script binding. The transform is pure and total
//! over the supported value shapes: null maps to null for every type,
//! and sequences are transformed element-wise with order and structure
//! preserved.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Escaping applied to an input value before binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscapingType {
    /// Bind the value as-is
    #[default]
    Text,
    /// Bind the value's text form as a JSON string literal
    #[serde(rename = "JSON")]
    Json,
    /// Bind the value's text form with XML reserved characters escaped
    #[serde(rename = "XML")]
    Xml,
}

impl EscapingType {
    /// MIME types accepted by ports declaring this escaping.
    pub fn mime_types(&self) -> &'static [&'static str] {
        match self {
            EscapingType::Text => &["text/plain"],
            EscapingType::Json => &["application/json"],
            EscapingType::Xml => &["application/xml"],
        }
    }

    /// Apply the transform to a value.
    pub fn apply(&self, value: &Value) -> Value {
        match value {
            Value::Null => Value::Null,
            Value::Array(items) if *self != EscapingType::Text => {
                Value::Array(items.iter().map(|item| self.apply(item)).collect())
            }
            _ => match self {
                EscapingType::Text => value.clone(),
                // Value::String's JSON rendering is exactly the escaped,
                // quoted string literal.
                EscapingType::Json => Value::String(Value::String(value_text(value)).to_string()),
                EscapingType::Xml => Value::String(escape_xml(&value_text(value))),
            },
        }
    }
}

impl std::fmt::Display for EscapingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EscapingType::Text => write!(f, "Text"),
            EscapingType::Json => write!(f, "JSON"),
            EscapingType::Xml => write!(f, "XML"),
        }
    }
}

/// Textual form of a value: a JSON string yields its contents, anything
/// else its JSON rendering.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_is_identity() {
        let value = json!({"k": ["v", 1]});
        assert_eq!(EscapingType::Text.apply(&value), value);
    }

    #[test]
    fn test_json_escapes_to_string_literal() {
        let escaped = EscapingType::Json.apply(&json!("he\"llo"));
        assert_eq!(escaped, json!("\"he\\\"llo\""));
    }

    #[test]
    fn test_json_uses_text_form_of_scalars() {
        assert_eq!(EscapingType::Json.apply(&json!(42)), json!("\"42\""));
    }

    #[test]
    fn test_xml_escapes_reserved_characters() {
        let escaped = EscapingType::Xml.apply(&json!("<a>&</a>"));
        assert_eq!(escaped, json!("&lt;a&gt;&amp;&lt;/a&gt;"));
    }

    #[test]
    fn test_xml_escapes_quotes() {
        let escaped = EscapingType::Xml.apply(&json!("\"'"));
        assert_eq!(escaped, json!("&quot;&apos;"));
    }

    #[test]
    fn test_null_maps_to_null_for_every_type() {
        for escaping in [EscapingType::Text, EscapingType::Json, EscapingType::Xml] {
            assert_eq!(escaping.apply(&Value::Null), Value::Null);
        }
    }

    #[test]
    fn test_sequences_transform_element_wise() {
        let escaped = EscapingType::Xml.apply(&json!(["<x>", ["<y>"], null]));
        assert_eq!(escaped, json!(["&lt;x&gt;", ["&lt;y&gt;"], null]));
    }

    #[test]
    fn test_default_is_text() {
        assert_eq!(EscapingType::default(), EscapingType::Text);
    }

    #[test]
    fn test_serde_names_match_display() {
        for escaping in [EscapingType::Text, EscapingType::Json, EscapingType::Xml] {
            let serialized = serde_json::to_string(&escaping).unwrap();
            assert_eq!(serialized, format!("\"{}\"", escaping));
        }
        let parsed: EscapingType = serde_json::from_str("\"XML\"").unwrap();
        assert_eq!(parsed, EscapingType::Xml);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(EscapingType::Json.mime_types(), &["application/json"]);
        assert_eq!(EscapingType::Text.mime_types(), &["text/plain"]);
        assert_eq!(EscapingType::Xml.mime_types(), &["application/xml"]);
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(&json!("plain")), "plain");
        assert_eq!(value_text(&json!(1.5)), "1.5");
        assert_eq!(value_text(&json!([1, 2])), "[1,2]");
    }
}
