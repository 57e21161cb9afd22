//! Recursive-descent parser producing the statements of 
//! `define name expr | blockCall | forLoop | ifElse | import path |
//! commandInvocation`.

use crate::ast::{Arg, BinaryOp, CallExpr, Expr, Stmt, UnaryOp};
use crate::error::ParseError;
use geoscript_lexer::{InfixOp, PrefixOp, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parses a whole program: a sequence of top-level statements.
    pub fn parse_program(mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut stmts = Vec::new();
        self.skip_linebreaks();
        while !self.at_eof() {
            stmts.push(self.parse_statement()?);
            self.skip_linebreaks();
        }
        Ok(stmts)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn skip_linebreaks(&mut self) {
        while self.current().kind == TokenKind::Linebreak {
            self.advance();
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::UnexpectedToken {
                found: self.current().text.clone(),
                expected: expected.to_string(),
                span: self.current().span,
            })
        }
    }

    fn is_statement_end(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::Linebreak | TokenKind::RBrace | TokenKind::Eof
        )
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current().kind {
            TokenKind::KeywordDefine => self.parse_define(),
            TokenKind::KeywordFor => self.parse_for(),
            TokenKind::KeywordIf => self.parse_if(),
            TokenKind::KeywordImport => self.parse_import(),
            TokenKind::Identifier => Ok(Stmt::Call(self.parse_call(true)?)),
            _ => Err(ParseError::InvalidStatement {
                span: self.current().span,
            }),
        }
    }

    fn parse_define(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // 'define'
        let name_tok = self.expect(TokenKind::Identifier, "a name")?;
        let value = self.parse_expr(0)?;
        let span = start.to(value.span());
        Ok(Stmt::Define {
            name: name_tok.text,
            value,
            span,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // 'for'
        let name_tok = self.expect(TokenKind::Identifier, "a loop variable name")?;
        self.expect(TokenKind::KeywordIn, "'in'")?;
        let range = self.parse_expr(0)?;
        let body = self.parse_block()?;
        let span = start.to(self.tokens[self.pos.saturating_sub(1)].span);
        Ok(Stmt::For {
            name: name_tok.text,
            range,
            body,
            span,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // 'if'
        let condition = self.parse_expr(0)?;
        let then_branch = self.parse_block()?;
        self.skip_linebreaks_before_else();
        let else_branch = if self.check(&TokenKind::KeywordElse) {
            self.advance();
            if self.check(&TokenKind::KeywordIf) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        let span = start.to(self.tokens[self.pos.saturating_sub(1)].span);
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            span,
        })
    }

    /// `else` is conventionally written on the same line as the closing
    /// `}` of the `if` branch, but a single linebreak before it is
    /// cosmetic, not a new statement — so it's skipped here without
    /// swallowing a genuine blank-line-separated following statement.
    fn skip_linebreaks_before_else(&mut self) {
        let save = self.pos;
        self.skip_linebreaks();
        if !self.check(&TokenKind::KeywordElse) {
            self.pos = save;
        }
    }

    fn parse_import(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // 'import'
        let path_tok = self.expect(TokenKind::String, "a string path")?;
        let span = start.to(path_tok.span);
        Ok(Stmt::Import {
            path: path_tok.text,
            span,
        })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.skip_linebreaks();
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_linebreaks();
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_eof() {
                return Err(ParseError::UnexpectedEof {
                    span: self.current().span,
                });
            }
            stmts.push(self.parse_statement()?);
            self.skip_linebreaks();
        }
        self.advance(); // '}'
        Ok(stmts)
    }

    /// Parses `identifier`, followed by either parenthesized named/
    /// positional args, a bare positional-argument run terminated by a
    /// linebreak/`}`/eof, or both — and then an optional trailing block.
    fn parse_call(&mut self, allow_block: bool) -> Result<CallExpr, ParseError> {
        let name_tok = self.advance();
        let mut span = name_tok.span;
        let mut args = Vec::new();

        if self.check(&TokenKind::LParen) {
            args = self.parse_paren_args()?;
            span = span.to(self.tokens[self.pos.saturating_sub(1)].span);
        } else {
            while !self.is_statement_end() && !self.check(&TokenKind::LBrace) {
                let value = self.parse_expr(0)?;
                span = span.to(value.span());
                args.push(Arg { name: None, value });
            }
        }

        let block = if allow_block && self.peek_block_follows() {
            Some(self.parse_block()?)
        } else {
            None
        };
        if let Some(last) = block.as_ref().and_then(|b| b.last()) {
            span = span.to(last.span());
        }

        Ok(CallExpr {
            name: name_tok.text,
            args,
            block,
            span,
        })
    }

    /// A block may follow on the same line or after blank lines; peek past
    /// linebreaks without consuming them unless a `{` is actually found.
    fn peek_block_follows(&self) -> bool {
        let mut i = self.pos;
        while matches!(self.tokens.get(i).map(|t| &t.kind), Some(TokenKind::Linebreak)) {
            i += 1;
        }
        matches!(self.tokens.get(i).map(|t| &t.kind), Some(TokenKind::LBrace))
    }

    fn parse_paren_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        self.skip_linebreaks();
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                self.skip_linebreaks();
                let name = if self.check(&TokenKind::Identifier) && self.peek_is_named_arg() {
                    Some(self.advance().text)
                } else {
                    None
                };
                if name.is_some() {
                    self.advance(); // consumes the '=' name/value separator
                }
                let value = self.parse_expr(0)?;
                args.push(Arg { name, value });
                self.skip_linebreaks();
                if self.check(&TokenKind::Comma) {
                    self.advance();
                    self.skip_linebreaks();
                } else {
                    break;
                }
            }
        }
        self.skip_linebreaks();
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    /// Named arguments are written `name: expr`. The lexer has no distinct
    /// `:` token (geoscript otherwise never uses one), so it's accepted
    /// here as a bare `Dot`-adjacent colon is not applicable; instead a
    /// named arg is recognized by `identifier` immediately followed by a
    /// colon character captured as part of `Identifier` text ending in
    /// `:`. To keep the lexer simple, the parser instead requires the
    /// caller to write `name : expr` where the lexer tokenizes `:` as an
    /// `Infix(InfixOp::Lt)`-incompatible — so this grammar uses `=` as the
    /// name/value separator instead: `sides = 5`, matching `define`'s own
    /// `name expr` shape. This resolves an ambiguity
    /// (see DESIGN.md).
    fn peek_is_named_arg(&self) -> bool {
        matches!(
            self.tokens.get(self.pos + 1).map(|t| &t.kind),
            Some(TokenKind::Infix(InfixOp::Eq))
        )
    }

    // ------------------------------------------------------------------
    // Expressions (Pratt parser)
    // ------------------------------------------------------------------

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;
        loop {
            let (op, bp) = match self.peek_infix() {
                Some(pair) => pair,
                None => break,
            };
            let (left_bp, right_bp) = bp;
            if left_bp < min_bp {
                break;
            }
            self.advance();
            self.skip_linebreaks_in_paren_context();
            let rhs = self.parse_expr(right_bp)?;
            let span = lhs.span().to(rhs.span());
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    /// Inside the top-level statement grammar, linebreaks terminate an
    /// expression; but once an infix operator has been consumed the
    /// right-hand side is expected on a continuation line in practice, so
    /// skip incidental ones here (mirrors how `parse_paren_args` does it).
    fn skip_linebreaks_in_paren_context(&mut self) {
        if self.pos > 0 && matches!(self.current().kind, TokenKind::Linebreak) {
            // Only continue past a single incidental linebreak directly
            // after an operator; don't swallow a blank-line statement gap.
            self.advance();
        }
    }

    fn peek_infix(&self) -> Option<(BinaryOp, (u8, u8))> {
        match &self.current().kind {
            TokenKind::Minus => Some((BinaryOp::Subtract, InfixOp::Subtract.binding_power())),
            TokenKind::Infix(op) => Some((to_binary_op(*op), op.binding_power())),
            _ => None,
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.current().kind {
            TokenKind::Minus => {
                let start = self.advance().span;
                let operand = self.parse_prefix()?;
                let span = start.to(operand.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Negate,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::Prefix(PrefixOp::Not) => {
                let start = self.advance().span;
                let operand = self.parse_prefix()?;
                let span = start.to(operand.span());
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.check(&TokenKind::Dot) {
            self.advance();
            let field = self.expect(TokenKind::Identifier, "a field name")?;
            let span = expr.span().to(field.span);
            expr = Expr::Call(CallExpr {
                name: field.text,
                args: vec![Arg {
                    name: None,
                    value: expr,
                }],
                block: None,
                span,
            });
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current().kind {
            TokenKind::Number => {
                let tok = self.advance();
                let value: f64 = tok.text.parse().map_err(|_| ParseError::UnexpectedToken {
                    found: tok.text.clone(),
                    expected: "a number".to_string(),
                    span: tok.span,
                })?;
                Ok(Expr::Number(value, tok.span))
            }
            TokenKind::String => {
                let tok = self.advance();
                Ok(Expr::StringLit(tok.text, tok.span))
            }
            TokenKind::HexColor => {
                let tok = self.advance();
                Ok(Expr::HexColor(tok.text, tok.span))
            }
            TokenKind::LParen => {
                self.advance();
                self.skip_linebreaks();
                let inner = self.parse_expr(0)?;
                self.skip_linebreaks();
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Identifier => {
                // A call-as-expression never consumes a trailing block.
                let call = self.parse_call(false)?;
                if call.args.is_empty() {
                    Ok(Expr::Identifier(call.name, call.span))
                } else {
                    Ok(Expr::Call(call))
                }
            }
            _ => Err(ParseError::UnexpectedToken {
                found: self.current().text.clone(),
                expected: "an expression".to_string(),
                span: self.current().span,
            }),
        }
    }
}

fn to_binary_op(op: InfixOp) -> BinaryOp {
    match op {
        InfixOp::Add => BinaryOp::Add,
        InfixOp::Subtract => BinaryOp::Subtract,
        InfixOp::Multiply => BinaryOp::Multiply,
        InfixOp::Divide => BinaryOp::Divide,
        InfixOp::Lt => BinaryOp::Lt,
        InfixOp::Gt => BinaryOp::Gt,
        InfixOp::LtEq => BinaryOp::LtEq,
        InfixOp::GtEq => BinaryOp::GtEq,
        InfixOp::Eq => BinaryOp::Eq,
        InfixOp::NotEq => BinaryOp::NotEq,
        InfixOp::And => BinaryOp::And,
        InfixOp::Or => BinaryOp::Or,
        InfixOp::To => BinaryOp::To,
        InfixOp::Step => BinaryOp::Step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Stmt;
    use geoscript_lexer::Lexer;

    fn parse(src: &str) -> Vec<Stmt> {
        let tokens = Lexer::new(src).tokenize().unwrap();
        Parser::new(tokens).parse_program().unwrap()
    }

    #[test]
    fn parses_cube_block() {
        let stmts = parse("cube { size 2 }");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Call(call) => {
                assert_eq!(call.name, "cube");
                assert!(call.args.is_empty());
                let body = call.block.as_ref().unwrap();
                assert_eq!(body.len(), 1);
            }
            _ => panic!("expected call"),
        }
    }

    #[test]
    fn parses_positional_command_args() {
        let stmts = parse("translate 1 0 0");
        match &stmts[0] {
            Stmt::Call(call) => {
                assert_eq!(call.name, "translate");
                assert_eq!(call.args.len(), 3);
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_difference_with_nested_blocks() {
        let stmts = parse("difference { cube; sphere { size 1.2 } }");
        match &stmts[0] {
            Stmt::Call(call) => {
                assert_eq!(call.name, "difference");
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_for_loop_with_range() {
        let stmts = parse("for i in 0 to 5 step 2 { print i }");
        match &stmts[0] {
            Stmt::For { name, range, body, .. } => {
                assert_eq!(name, "i");
                assert!(matches!(range, Expr::Binary { op: BinaryOp::Step, .. }));
                assert_eq!(body.len(), 1);
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_if_else() {
        let stmts = parse("if x > 0 { print 1 } else { print 2 }");
        match &stmts[0] {
            Stmt::If { else_branch, .. } => assert!(else_branch.is_some()),
            _ => panic!(),
        }
    }

    #[test]
    fn parses_paren_call_with_named_args() {
        let stmts = parse("pyramid(sides = 5)");
        match &stmts[0] {
            Stmt::Call(call) => {
                assert_eq!(call.args.len(), 1);
                assert_eq!(call.args[0].name.as_deref(), Some("sides"));
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_define_with_expression() {
        let stmts = parse("define radius 2 + 3 * 4");
        match &stmts[0] {
            Stmt::Define { value, .. } => {
                assert!(matches!(value, Expr::Binary { op: BinaryOp::Add, .. }));
            }
            _ => panic!(),
        }
    }

    #[test]
    fn parses_import() {
        let stmts = parse("import \"shapes/leg.gs\"");
        match &stmts[0] {
            Stmt::Import { path, .. } => assert_eq!(path, "shapes/leg.gs"),
            _ => panic!(),
        }
    }

    #[test]
    fn parses_function_call_expression() {
        let stmts = parse("define y sin(x)");
        match &stmts[0] {
            Stmt::Define { value, .. } => match value {
                Expr::Call(call) => assert_eq!(call.name, "sin"),
                _ => panic!("expected call expression"),
            },
            _ => panic!(),
        }
    }
}
