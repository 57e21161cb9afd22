//! Evaluator errors.

use geoscript_diagnostics::{Diagnostic, Severity, Span, Stage};
use geoscript_kernel::GeometryError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },
    #[error("expected 1, 2 or 3 numbers, got {0}")]
    InvalidVectorArity(usize),
    #[error("invalid color literal: {0}")]
    InvalidColor(String),
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("assertion failed: {0}")]
    AssertionFailure(String),
    #[error("missing argument: {0}")]
    MissingArgument(String),
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("file access restricted: {0}")]
    FileAccessRestricted(String),
    #[error("could not parse file: {0}")]
    FileParsingError(String),
    #[error("file type mismatch: {0}")]
    FileTypeMismatch(String),
    #[error("unknown font: {0}")]
    UnknownFont(String),
    #[error(transparent)]
    Geometry(GeometryError),
    #[error("import error: {0}")]
    Import(Box<EvalError>),
    #[error("build was cancelled")]
    Cancelled,
}

/// `GeometryError::Cancelled` becomes the dedicated `EvalError::Cancelled`
/// sentinel rather than a wrapped geometry error, so the evaluator never
/// accidentally surfaces cancellation as a user-facing diagnostic.
impl From<GeometryError> for EvalError {
    fn from(e: GeometryError) -> Self {
        match e {
            GeometryError::Cancelled => EvalError::Cancelled,
            other => EvalError::Geometry(other),
        }
    }
}

impl EvalError {
    /// Wraps an inner error raised while evaluating an imported file (spec
    /// §7 "importError wrapping inner").
    pub fn import(inner: EvalError) -> EvalError {
        EvalError::Import(Box::new(inner))
    }

    /// Converts to the shared diagnostic currency, stamping `span`.
    /// `Cancelled` is excluded — callers must check for it before calling
    /// this, matching the kernel's own `GeometryError::Cancelled` handling.
    pub fn into_diagnostic(self, span: Span) -> Diagnostic {
        let hint = self.hint();
        Diagnostic::new(Severity::Error, Stage::Eval, self.to_string(), span).with_hint(hint)
    }

    fn hint(&self) -> String {
        match self {
            EvalError::TypeMismatch { expected, .. } => format!("expected a {expected} here"),
            EvalError::UnknownSymbol(_) => "check spelling or missing `define`".to_string(),
            EvalError::AssertionFailure(_) => "the asserted condition evaluated to false".to_string(),
            _ => "see the geoscript language reference".to_string(),
        }
    }
}
