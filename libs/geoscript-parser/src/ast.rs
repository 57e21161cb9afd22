//! AST node types produced by the parser.

use geoscript_diagnostics::Span;

/// A top-level or block-body statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `define name expr`
    Define { name: String, value: Expr, span: Span },
    /// `for name in range { ... }`
    For {
        name: String,
        range: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    /// `if expr { ... } [else { ... } | else if ...]`
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
        span: Span,
    },
    /// `import "path"`
    Import { path: String, span: Span },
    /// A block call, command invocation, or property assignment, e.g.
    /// `cube { size 2 }`, `translate 1 0 0`, `color #f00`.
    Call(CallExpr),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Define { span, .. }
            | Stmt::For { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Import { span, .. } => *span,
            Stmt::Call(call) => call.span,
        }
    }
}

/// A single argument to a parenthesized call: either positional or named
/// (`sides: 5`).
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
}

/// An identifier applied to arguments and/or a trailing block, covering
/// both "commands" (`translate 1 0 0`) and "blocks" (`cube { size 2 }`,
/// `pyramid(sides: 5)`) at the syntax level — the evaluator's symbol table
/// decides which symbol kind `name` resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Arg>,
    pub block: Option<Vec<Stmt>>,
    pub span: Span,
}

/// An expression. Values are dynamically typed at evaluation time (spec
/// §4.8's tagged-union value domain); the parser only builds syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64, Span),
    StringLit(String, Span),
    HexColor(String, Span),
    Identifier(String, Span),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    /// A nested call used as a value, e.g. `sin(x)` or a property read
    /// through a zero-arg call.
    Call(CallExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, s)
            | Expr::StringLit(_, s)
            | Expr::HexColor(_, s)
            | Expr::Identifier(_, s) => *s,
            Expr::Unary { span, .. } | Expr::Binary { span, .. } => *span,
            Expr::Call(call) => call.span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
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
    /// `a to b`: constructs a `Range` value consumed by `for`.
    To,
    /// `(a to b) step c`
    Step,
}
