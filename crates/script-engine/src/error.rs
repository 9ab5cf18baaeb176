//! Error types for script engines

use std::fmt;

/// Failure raised by an engine while binding variables or evaluating a
/// script.
///
/// The message is preserved verbatim from the underlying interpreter. The
/// source line is an explicit optional field; backends that cannot locate
/// one leave it unset rather than reporting a bogus position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    /// Interpreter message, verbatim
    pub message: String,
    /// Source line of the failure, when the interpreter reported one
    pub line: Option<usize>,
}

impl EvalError {
    /// Create an error with no known source line
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    /// Create an error anchored to a source line
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "Line {}: {}", line, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for EvalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_line() {
        let err = EvalError::at_line(7, "unknown variable");
        assert_eq!(err.to_string(), "Line 7: unknown variable");
    }

    #[test]
    fn test_display_without_line() {
        let err = EvalError::message("unknown variable");
        assert_eq!(err.to_string(), "unknown variable");
    }
}
