//! Parser error kinds.

use geoscript_diagnostics::{Diagnostic, Severity, Span, Stage};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected token {found:?}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    #[error("invalid statement")]
    InvalidStatement { span: Span },

    #[error("missing argument to '{name}'")]
    MissingArgument { name: String, span: Span },

    #[error("unexpected end of input")]
    UnexpectedEof { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::InvalidStatement { span }
            | ParseError::MissingArgument { span, .. }
            | ParseError::UnexpectedEof { span } => *span,
        }
    }

    pub fn hint(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, .. } => format!("expected {expected} here"),
            ParseError::InvalidStatement { .. } => {
                "statements are define/for/if/import or a block/command call".to_string()
            }
            ParseError::MissingArgument { name, .. } => {
                format!("'{name}' requires at least one more argument")
            }
            ParseError::UnexpectedEof { .. } => "the source ends before a statement completes".to_string(),
        }
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        let span = err.span();
        let hint = err.hint();
        Diagnostic::new(Severity::Error, Stage::Parse, err.to_string(), span).with_hint(hint)
    }
}
