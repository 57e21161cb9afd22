//! # geoscript-parser
//!
//! The AST types and recursive-descent parser for the geoscript scene
//! description language: `define name expr | blockCall | forLoop
//! | ifElse | import path | commandInvocation`.
//!
//! Consumes the token stream produced by `geoscript-lexer` and produces a
//! `Vec<Stmt>` for a top-level program, or for a block body.

pub mod ast;
pub mod error;
pub mod parser;

pub use ast::{Arg, BinaryOp, CallExpr, Expr, Stmt, UnaryOp};
pub use error::ParseError;
pub use parser::Parser;

/// Parses a complete program from already-lexed tokens.
pub fn parse_program(tokens: Vec<geoscript_lexer::Token>) -> Result<Vec<Stmt>, ParseError> {
    Parser::new(tokens).parse_program()
}
