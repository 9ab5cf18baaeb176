//! Port model and name sanitization
//!
//! Ports carry a declared nesting depth (0 = scalar, >0 = nested
//! sequences). The three stream pseudo-ports are reserved, exact,
//! case-sensitive tokens and are never sanitized.

use serde::{Deserialize, Serialize};

/// Reserved pseudo-port feeding the engine's input channel.
pub const STDIN: &str = "STDIN";

/// Reserved pseudo-port carrying the captured standard-output text.
pub const STDOUT: &str = "STDOUT";

/// Reserved pseudo-port carrying the captured standard-error text.
pub const STDERR: &str = "STDERR";

/// Whether a name is one of the reserved stream tokens.
pub fn is_reserved_port_name(name: &str) -> bool {
    name == STDIN || name == STDOUT || name == STDERR
}

/// Concrete type an input reference is rendered to before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Render to text (element-wise for sequences)
    Text,
    /// Render to the stored structured value
    Json,
}

/// Declared input port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPortDefinition {
    /// External data-port name as declared by the workflow
    pub name: String,
    /// Declared nesting depth of values arriving on this port
    pub depth: u32,
    /// Element type the reference service renders to
    pub element_type: ElementType,
}

impl InputPortDefinition {
    /// Create an input port definition
    pub fn new(name: impl Into<String>, depth: u32, element_type: ElementType) -> Self {
        Self {
            name: name.into(),
            depth,
            element_type,
        }
    }
}

/// Declared output port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPortDefinition {
    /// Port name; outputs are matched against the script's binding table
    /// under this exact name
    pub name: String,
    /// Declared nesting depth of produced values
    pub depth: u32,
    /// Depth at which partial results may be emitted; normalized to equal
    /// `depth` at configure time
    pub granular_depth: u32,
}

impl OutputPortDefinition {
    /// Create an output port definition with granular depth equal to depth
    pub fn new(name: impl Into<String>, depth: u32) -> Self {
        Self {
            name: name.into(),
            depth,
            granular_depth: depth,
        }
    }

    /// Override the granular depth (older workflow definitions carry 0)
    pub fn with_granular_depth(mut self, granular_depth: u32) -> Self {
        self.granular_depth = granular_depth;
        self
    }
}

/// Removes any invalid characters from a data-port name so it can serve
/// as a script variable, e.g. `xml-text` becomes `xmltext`.
///
/// A name already made of word characters passes through unchanged;
/// anything else is rebuilt keeping only ASCII letters, digits and
/// underscore, with no substitution character inserted.
pub fn sanitize_port_name(name: &str) -> String {
    let word = |c: char| c.is_ascii_alphanumeric() || c == '_';
    if !name.is_empty() && name.chars().all(word) {
        return name.to_string();
    }
    name.chars().filter(|c| word(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_invalid_characters() {
        assert_eq!(sanitize_port_name("xml-text"), "xmltext");
        assert_eq!(sanitize_port_name("a b.c/d"), "abcd");
    }

    #[test]
    fn test_sanitize_keeps_word_names_unchanged() {
        assert_eq!(sanitize_port_name("abc_123"), "abc_123");
        assert_eq!(sanitize_port_name("_"), "_");
    }

    #[test]
    fn test_sanitize_discards_non_ascii() {
        assert_eq!(sanitize_port_name("caf\u{e9}-1"), "caf1");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for name in ["xml-text", "a b.c/d", "++", "caf\u{e9}-1", "plain"] {
            let once = sanitize_port_name(name);
            assert_eq!(sanitize_port_name(&once), once);
        }
    }

    #[test]
    fn test_reserved_tokens_are_exact_and_case_sensitive() {
        assert!(is_reserved_port_name("STDIN"));
        assert!(is_reserved_port_name("STDOUT"));
        assert!(is_reserved_port_name("STDERR"));
        assert!(!is_reserved_port_name("stdout"));
        assert!(!is_reserved_port_name("STDOUT "));
    }

    #[test]
    fn test_output_port_granular_depth_defaults_to_depth() {
        let port = OutputPortDefinition::new("result", 2);
        assert_eq!(port.granular_depth, 2);
        let legacy = OutputPortDefinition::new("result", 2).with_granular_depth(0);
        assert_eq!(legacy.granular_depth, 0);
    }

    #[test]
    fn test_port_serde_is_camel_case() {
        let port = InputPortDefinition::new("in1", 1, ElementType::Text);
        let json = serde_json::to_string(&port).unwrap();
        assert!(json.contains("elementType"));

        let out = OutputPortDefinition::new("out1", 0);
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("granularDepth"));
    }
}
