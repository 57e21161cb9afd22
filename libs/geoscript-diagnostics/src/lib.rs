//! # Diagnostics
//!
//! Shared source-span and diagnostic types used across every stage of the
//! geoscript pipeline (lexer → parser → evaluator → kernel → engine). A
//! single `Diagnostic` shape lets a host render its own error UI without
//! parsing stage-specific error strings.
//!
//! ## Usage
//!
//! ```rust
//! use geoscript_diagnostics::{Diagnostic, Severity, Span, Stage};
//!
//! let diag = Diagnostic::new(Severity::Error, Stage::Parse, "unexpected token", Span::new(4, 8))
//!     .with_hint("expected an expression here");
//! assert_eq!(diag.span, Span::new(4, 8));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open byte range `[start, end)` in the original source text.
///
/// Spans are preserved end-to-end through the pipeline: the lexer stamps
/// tokens, the parser stamps AST nodes, the evaluator stamps geometry nodes
/// (`sourceLocation`, ), and every error type carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `offset`, used for diagnostics with no natural
    /// range (e.g. "missing argument" after the end of a call).
    pub const fn point(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span containing both `self` and `other`.
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// Anything that can report where it came from in the source text.
pub trait Spanned {
    fn span(&self) -> Span;
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// Which pipeline stage raised a diagnostic. Mirrors the error-kind
/// families of (LexerError, ParserError, RuntimeError,
/// GeometryError) plus the two non-script-facing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Lex,
    Parse,
    Eval,
    Kernel,
    Engine,
}

/// A single diagnostic with enough context for a host to render a caret
/// under the offending source range and a human-readable hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    pub span: Span,
    pub hint: Option<String>,
    /// Set by `EvalError::Import` wrapping: the source text of the file the
    /// inner diagnostic's span refers to, so a host can re-render the caret
    /// without re-resolving the import.
    pub imported_source: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, stage: Stage, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity,
            stage,
            message: message.into(),
            span,
            hint: None,
            imported_source: None,
        }
    }

    pub fn error(stage: Stage, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Error, stage, message, span)
    }

    pub fn warning(stage: Stage, message: impl Into<String>, span: Span) -> Self {
        Self::new(Severity::Warning, stage, message, span)
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_imported_source(mut self, source: impl Into<String>) -> Self {
        self.imported_source = Some(source.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}..{})",
            self.severity.as_str(),
            self.message,
            self.span.start,
            self.span.end
        )?;
        if let Some(hint) = &self.hint {
            write!(f, " — {hint}")?;
        }
        Ok(())
    }
}

/// Cooperative cancellation sentinel, threaded through every checkpointed
/// stage (parsing, evaluation, BSP construction, CSG, watertight repair).
/// Deliberately not a `Diagnostic` — cancellation is not an error, it's a
/// sentinel, so it never round-trips through `Into<Diagnostic>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "build cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Polled at every checkpoint in parsing, evaluation, and mesh building.
/// A closure-backed callback lets a host wire this to an atomic flag, a
/// channel, or a test stub.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

impl<F: Fn() -> bool> CancelToken for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// A token that never reports cancellation, for hosts that don't need it
/// (tests, one-shot CLI builds).
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Checks `token` and returns `Err(Cancelled)` if it reports cancellation.
/// Called at the checkpoints documented in between top-level
/// statements/polygons inside parsing, evaluation, BSP construction, CSG
/// operators, and watertight repair.
pub fn checkpoint(token: &dyn CancelToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_to_joins_ranges() {
        let a = Span::new(0, 4);
        let b = Span::new(10, 12);
        assert_eq!(a.to(b), Span::new(0, 12));
    }

    #[test]
    fn diagnostic_display_includes_hint() {
        let diag = Diagnostic::error(Stage::Parse, "bad token", Span::new(1, 2))
            .with_hint("try again");
        assert!(diag.to_string().contains("try again"));
    }

    #[test]
    fn checkpoint_reports_cancellation() {
        let cancelled = true;
        let token = move || cancelled;
        assert!(checkpoint(&token).is_err());
        assert!(checkpoint(&NeverCancel).is_ok());
    }
}
