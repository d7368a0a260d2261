use serde::{Deserialize, Serialize};
use std::fmt;

/// A learner-facing parse error. Produced by the manifest normalizer and
/// the command interpreter; the runner recovers these into feedback text,
/// they are never operational failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    /// Malformed YAML or command syntax. Line/column are 1-based where the
    /// underlying parser reports a location.
    Syntax {
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        column: Option<u32>,
        message: String,
    },
    /// Structurally valid input using a construct the engine does not
    /// grade (shell pipes, multi-document streams, YAML tags, ...).
    UnsupportedSyntax { construct: String, message: String },
}

impl ParseError {
    pub fn syntax(message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn syntax_at(line: u32, column: u32, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line: Some(line),
            column: Some(column),
            message: message.into(),
        }
    }

    pub fn unsupported(construct: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError::UnsupportedSyntax {
            construct: construct.into(),
            message: message.into(),
        }
    }

    /// The hint shown to the learner when grading stops at the parse phase.
    pub fn to_hint(&self) -> String {
        match self {
            ParseError::Syntax {
                line: Some(line),
                column: Some(column),
                message,
            } => format!("fix your syntax: {} (line {}, column {})", message, line, column),
            ParseError::Syntax {
                line: Some(line),
                message,
                ..
            } => format!("fix your syntax: {} (line {})", message, line),
            ParseError::Syntax { message, .. } => format!("fix your syntax: {}", message),
            ParseError::UnsupportedSyntax { construct, .. } => format!(
                "this exercise doesn't support that syntax: {}",
                construct
            ),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax {
                line: Some(line),
                column: Some(column),
                message,
            } => write!(f, "syntax error at line {}, column {}: {}", line, column, message),
            ParseError::Syntax {
                line: Some(line),
                message,
                ..
            } => write!(f, "syntax error at line {}: {}", line, message),
            ParseError::Syntax { message, .. } => write!(f, "syntax error: {}", message),
            ParseError::UnsupportedSyntax { construct, message } => {
                write!(f, "unsupported syntax '{}': {}", construct, message)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Either a learner parse error or a blown wall-clock budget. Returned by
/// the budget-aware normalizer/interpreter entry points so the runner can
/// route the two outcomes differently: parse errors become feedback,
/// deadline misses become operational timeouts.
#[derive(Debug, Clone, PartialEq)]
pub enum Interrupt {
    Parse(ParseError),
    Deadline(crate::budget::DeadlineExceeded),
}

impl From<ParseError> for Interrupt {
    fn from(e: ParseError) -> Self {
        Interrupt::Parse(e)
    }
}

impl From<crate::budget::DeadlineExceeded> for Interrupt {
    fn from(e: crate::budget::DeadlineExceeded) -> Self {
        Interrupt::Deadline(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_hint_includes_location() {
        let err = ParseError::syntax_at(4, 7, "mapping values are not allowed here");
        assert_eq!(
            err.to_hint(),
            "fix your syntax: mapping values are not allowed here (line 4, column 7)"
        );
    }

    #[test]
    fn unsupported_hint_names_construct() {
        let err = ParseError::unsupported("pipe", "shell pipes are not graded");
        assert!(err.to_hint().contains("pipe"));
        assert!(!err.to_hint().contains("graded syntax error"));
    }
}
