//! Lexer error kinds, each
//! carrying a source range and a human hint.

use geoscript_diagnostics::{Diagnostic, Severity, Span, Stage};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid number literal {text:?}")]
    InvalidNumber { text: String, span: Span },

    #[error("invalid color literal {text:?}")]
    InvalidColor { text: String, span: Span },

    #[error("unexpected character {ch:?}")]
    UnexpectedToken { ch: char, span: Span },

    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("invalid escape sequence \\{ch}")]
    InvalidEscapeSequence { ch: char, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidNumber { span, .. }
            | LexError::InvalidColor { span, .. }
            | LexError::UnexpectedToken { span, .. }
            | LexError::UnterminatedString { span, .. }
            | LexError::InvalidEscapeSequence { span, .. } => *span,
        }
    }

    pub fn hint(&self) -> String {
        match self {
            LexError::InvalidNumber { text, .. } => {
                format!("{text:?} is not a valid number; use digits, one decimal point, and an optional exponent")
            }
            LexError::InvalidColor { text, .. } => format!(
                "{text:?} must be 3, 4, 6 or 8 hex digits after '#' (e.g. #f00 or #ff0000ff)"
            ),
            LexError::UnexpectedToken { ch, .. } => {
                format!("remove or replace the unexpected character '{ch}'")
            }
            LexError::UnterminatedString { .. } => {
                "add a closing '\"' before the end of the line".to_string()
            }
            LexError::InvalidEscapeSequence { ch, .. } => {
                format!("'\\{ch}' is not a recognized escape; use \\\\, \\\", or \\n")
            }
        }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        let span = err.span();
        let hint = err.hint();
        Diagnostic::new(Severity::Error, Stage::Lex, err.to_string(), span).with_hint(hint)
    }
}
