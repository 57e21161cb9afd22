//! # Tokens
//!
//! Token kinds for the geoscript scene-description language.
//!
//! ## Example
//!
//! ```rust
//! use geoscript_lexer::{Token, TokenKind};
//! use geoscript_diagnostics::Span;
//!
//! let token = Token::new(TokenKind::Number, Span::new(0, 2), "10".to_string(), false);
//! assert_eq!(token.kind, TokenKind::Number);
//! ```

use geoscript_diagnostics::{Span, Spanned};

/// A single lexed token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
    /// Whether whitespace (other than a linebreak) immediately preceded
    /// this token. Used to disambiguate `identifier (` forms.
    pub space_before: bool,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: String, space_before: bool) -> Self {
        Self {
            kind,
            span,
            text,
            space_before,
        }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

/// Token kinds, matching enumeration:
/// `linebreak, identifier, keyword, hexColor, infix, prefix, number,
/// string, lbrace, rbrace, lparen, rparen, dot, eof`. Keywords, infix and
/// prefix operators are further distinguished below so the parser doesn't
/// need to re-parse token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A run of one or more `\n` (collapsed by the lexer).
    Linebreak,
    Identifier,
    /// `define`
    KeywordDefine,
    /// `for`
    KeywordFor,
    /// `in` (range loop: `for name in range { … }`)
    KeywordIn,
    /// `if`
    KeywordIf,
    /// `else`
    KeywordElse,
    /// `import`
    KeywordImport,
    /// `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
    HexColor,
    /// Number literal, e.g. `10`, `3.14`, `.5`
    Number,
    /// Double-quoted string literal
    String,
    LBrace,
    RBrace,
    LParen,
    RParen,
    Dot,
    Comma,
    /// `-`. Ambiguous: the parser resolves this to `BinaryOp::Subtract` in
    /// infix position or `UnaryOp::Negate` in prefix position, since the
    /// lexer alone can't tell `a - b` from `a (-b)` apart.
    Minus,
    /// Unambiguous infix operators: `+ * / < > <= >= = <> and or to step`
    Infix(InfixOp),
    /// Unambiguous prefix operators: `not`
    Prefix(PrefixOp),
    Eof,
}

/// Binary/infix operators recognized by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Add,
    /// Synthesized by the parser from a `Minus` token in infix position;
    /// the lexer never emits this variant directly.
    Subtract,
    Multiply,
    Divide,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,
    And,
    Or,
    /// `to`, range bound: `0 to 5`
    To,
    /// `step`, range stride: `0 to 5 step 2`
    Step,
}

impl InfixOp {
    /// Binding power for Pratt-style expression parsing; higher binds
    /// tighter. Ties broken left-associatively except where noted.
    pub fn binding_power(self) -> (u8, u8) {
        match self {
            InfixOp::Or => (1, 2),
            InfixOp::And => (3, 4),
            InfixOp::Eq | InfixOp::NotEq => (5, 6),
            InfixOp::Lt | InfixOp::Gt | InfixOp::LtEq | InfixOp::GtEq => (7, 8),
            InfixOp::To => (9, 10),
            InfixOp::Step => (9, 10),
            InfixOp::Add | InfixOp::Subtract => (11, 12),
            InfixOp::Multiply | InfixOp::Divide => (13, 14),
        }
    }
}

/// Unary/prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOp {
    Negate,
    Not,
}
