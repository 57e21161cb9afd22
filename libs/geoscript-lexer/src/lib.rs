//! # geoscript-lexer
//!
//! Tokenizes geoscript scene-description source into a token stream
//!. Pure Rust, no external grammar dependency — safe to run
//! in a browser/WASM host with no filesystem or C toolchain.
//!
//! ## Example
//!
//! ```rust
//! use geoscript_lexer::{Lexer, TokenKind};
//!
//! let tokens = Lexer::new("cube { size 2 }").tokenize().unwrap();
//! assert_eq!(tokens[0].kind, TokenKind::Identifier);
//! ```

mod cursor;
mod error;
mod token;

pub use cursor::Cursor;
pub use error::LexError;
pub use token::{InfixOp, PrefixOp, Token, TokenKind};

use geoscript_diagnostics::Span;

/// Tokenizes `source` into a flat token stream, terminated by `Eof`.
pub struct Lexer<'a> {
    source: &'a str,
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: Cursor::new(source),
            tokens: Vec::new(),
        }
    }

    /// Tokenizes the entire source, stopping at the first lexer error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            let space_before = self.skip_whitespace_and_comments();
            if self.cursor.is_eof() {
                break;
            }
            self.scan_token(space_before)?;
        }
        let eof_pos = self.cursor.position();
        self.tokens.push(Token::new(
            TokenKind::Eof,
            Span::point(eof_pos),
            String::new(),
            false,
        ));
        Ok(self.tokens)
    }

    /// Skips horizontal whitespace and `//` line comments, but folds any
    /// run of one or more newlines or `;` statement separators into a
    /// single `Linebreak` token (spec §4.7: "consecutive linebreaks
    /// collapse"). Returns whether non-newline whitespace preceded the
    /// next real token.
    fn skip_whitespace_and_comments(&mut self) -> bool {
        let mut space_before = false;
        let mut saw_newline = false;
        let linebreak_start = self.cursor.position();
        loop {
            match self.cursor.peek() {
                Some(c) if c == '\n' || c == ';' => {
                    saw_newline = true;
                    self.cursor.advance();
                }
                Some(c) if c.is_whitespace() => {
                    space_before = true;
                    self.cursor.advance();
                }
                Some('/') if self.cursor.peek_next() == Some('/') => {
                    self.cursor.advance();
                    self.cursor.advance();
                    self.cursor.advance_while(|c| c != '\n');
                }
                _ => break,
            }
        }
        if saw_newline {
            self.tokens.push(Token::new(
                TokenKind::Linebreak,
                Span::new(linebreak_start, self.cursor.position()),
                "\n".to_string(),
                false,
            ));
            false
        } else {
            space_before
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, text: String, space_before: bool) {
        let end = self.cursor.position();
        self.tokens.push(Token::new(kind, Span::new(start, end), text, space_before));
    }

    fn scan_token(&mut self, space_before: bool) -> Result<(), LexError> {
        let start = self.cursor.position();
        let c = self.cursor.advance().expect("checked not eof");

        match c {
            '{' => self.push(TokenKind::LBrace, start, c.to_string(), space_before),
            '}' => self.push(TokenKind::RBrace, start, c.to_string(), space_before),
            '(' => self.push(TokenKind::LParen, start, c.to_string(), space_before),
            ')' => self.push(TokenKind::RParen, start, c.to_string(), space_before),
            ',' => self.push(TokenKind::Comma, start, c.to_string(), space_before),
            '+' => self.push(TokenKind::Infix(InfixOp::Add), start, c.to_string(), space_before),
            '-' => self.push(TokenKind::Minus, start, c.to_string(), space_before),
            '*' => self.push(TokenKind::Infix(InfixOp::Multiply), start, c.to_string(), space_before),
            '/' => self.push(TokenKind::Infix(InfixOp::Divide), start, c.to_string(), space_before),
            '<' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    self.push(TokenKind::Infix(InfixOp::LtEq), start, "<=".to_string(), space_before);
                } else if self.cursor.peek() == Some('>') {
                    self.cursor.advance();
                    self.push(TokenKind::Infix(InfixOp::NotEq), start, "<>".to_string(), space_before);
                } else {
                    self.push(TokenKind::Infix(InfixOp::Lt), start, c.to_string(), space_before);
                }
            }
            '>' => {
                if self.cursor.peek() == Some('=') {
                    self.cursor.advance();
                    self.push(TokenKind::Infix(InfixOp::GtEq), start, ">=".to_string(), space_before);
                } else {
                    self.push(TokenKind::Infix(InfixOp::Gt), start, c.to_string(), space_before);
                }
            }
            '=' => self.push(TokenKind::Infix(InfixOp::Eq), start, c.to_string(), space_before),
            '.' => {
                if self.cursor.peek().map_or(false, |n| n.is_ascii_digit()) {
                    self.scan_number(start, space_before)?;
                } else {
                    self.push(TokenKind::Dot, start, c.to_string(), space_before);
                }
            }
            '#' => self.scan_hex_color(start, space_before)?,
            '"' => self.scan_string(start, space_before)?,
            c if c.is_ascii_digit() => self.scan_number(start, space_before)?,
            c if is_ident_start(c) => self.scan_identifier_or_keyword(start, space_before),
            other => {
                return Err(LexError::UnexpectedToken {
                    ch: other,
                    span: Span::new(start, self.cursor.position()),
                })
            }
        }
        Ok(())
    }

    fn scan_number(&mut self, start: usize, space_before: bool) -> Result<(), LexError> {
        self.cursor.advance_while(|c| c.is_ascii_digit());
        if self.cursor.peek() == Some('.') && self.cursor.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            self.cursor.advance();
            self.cursor.advance_while(|c| c.is_ascii_digit());
        }
        if matches!(self.cursor.peek(), Some('e') | Some('E')) {
            let mut lookahead = self.cursor_clone_for_exponent();
            lookahead.advance();
            if matches!(lookahead.peek(), Some('+') | Some('-')) {
                lookahead.advance();
            }
            if lookahead.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                    self.cursor.advance();
                }
                self.cursor.advance_while(|c| c.is_ascii_digit());
            }
        }
        let end = self.cursor.position();
        let text = self.source[start..end].to_string();
        if text.parse::<f64>().is_err() {
            return Err(LexError::InvalidNumber {
                text,
                span: Span::new(start, end),
            });
        }
        self.push(TokenKind::Number, start, text, space_before);
        Ok(())
    }

    /// A throwaway cursor positioned where `self.cursor` currently is, used
    /// to look ahead past a possible exponent without committing to it.
    fn cursor_clone_for_exponent(&self) -> Cursor<'a> {
        Cursor::new(&self.source[self.cursor.position()..])
    }

    fn scan_hex_color(&mut self, start: usize, space_before: bool) -> Result<(), LexError> {
        let digits_start = self.cursor.position();
        self.cursor.advance_while(|c| c.is_ascii_hexdigit());
        let len = self.cursor.position() - digits_start;
        if !matches!(len, 3 | 4 | 6 | 8) {
            let end = self.cursor.position();
            return Err(LexError::InvalidColor {
                text: self.source[start..end].to_string(),
                span: Span::new(start, end),
            });
        }
        let end = self.cursor.position();
        self.push(TokenKind::HexColor, start, self.source[start..end].to_string(), space_before);
        Ok(())
    }

    fn scan_string(&mut self, start: usize, space_before: bool) -> Result<(), LexError> {
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    return Err(LexError::UnterminatedString {
                        span: Span::new(start, self.cursor.position()),
                    })
                }
                Some('"') => {
                    self.cursor.advance();
                    break;
                }
                Some('\\') => {
                    let escape_start = self.cursor.position();
                    self.cursor.advance();
                    match self.cursor.peek() {
                        Some('n') => {
                            value.push('\n');
                            self.cursor.advance();
                        }
                        Some('t') => {
                            value.push('\t');
                            self.cursor.advance();
                        }
                        Some('"') => {
                            value.push('"');
                            self.cursor.advance();
                        }
                        Some('\\') => {
                            value.push('\\');
                            self.cursor.advance();
                        }
                        Some(other) => {
                            return Err(LexError::InvalidEscapeSequence {
                                ch: other,
                                span: Span::new(escape_start, self.cursor.position() + other.len_utf8()),
                            })
                        }
                        None => {
                            return Err(LexError::UnterminatedString {
                                span: Span::new(start, self.cursor.position()),
                            })
                        }
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.cursor.advance();
                }
            }
        }
        self.push(TokenKind::String, start, value, space_before);
        Ok(())
    }

    fn scan_identifier_or_keyword(&mut self, start: usize, space_before: bool) {
        self.cursor.advance_while(is_ident_continue);
        let end = self.cursor.position();
        let text = &self.source[start..end];
        let kind = match text {
            "define" => TokenKind::KeywordDefine,
            "for" => TokenKind::KeywordFor,
            "in" => TokenKind::KeywordIn,
            "if" => TokenKind::KeywordIf,
            "else" => TokenKind::KeywordElse,
            "import" => TokenKind::KeywordImport,
            "and" => TokenKind::Infix(InfixOp::And),
            "or" => TokenKind::Infix(InfixOp::Or),
            "not" => TokenKind::Prefix(PrefixOp::Not),
            "to" => TokenKind::Infix(InfixOp::To),
            "step" => TokenKind::Infix(InfixOp::Step),
            _ => TokenKind::Identifier,
        };
        self.push(kind, start, text.to_string(), space_before);
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_block_call() {
        let ks = kinds("cube { size 2 }");
        assert_eq!(
            ks,
            vec![
                TokenKind::Identifier,
                TokenKind::LBrace,
                TokenKind::Identifier,
                TokenKind::Number,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn collapses_consecutive_linebreaks() {
        let ks = kinds("a\n\n\nb");
        assert_eq!(ks, vec![TokenKind::Identifier, TokenKind::Linebreak, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn semicolon_is_a_statement_separator() {
        let ks = kinds("a; b");
        assert_eq!(ks, vec![TokenKind::Identifier, TokenKind::Linebreak, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn skips_line_comments() {
        let ks = kinds("a // comment\nb");
        assert_eq!(ks, vec![TokenKind::Identifier, TokenKind::Linebreak, TokenKind::Identifier, TokenKind::Eof]);
    }

    #[test]
    fn lexes_hex_colors() {
        for src in ["#f00", "#f00a", "#ff0000", "#ff0000aa"] {
            let ks = kinds(src);
            assert_eq!(ks, vec![TokenKind::HexColor, TokenKind::Eof], "{src}");
        }
    }

    #[test]
    fn rejects_bad_hex_color_length() {
        let err = Lexer::new("#ff").tokenize().unwrap_err();
        assert!(matches!(err, LexError::InvalidColor { .. }));
    }

    #[test]
    fn lexes_range_keywords() {
        let ks = kinds("0 to 5 step 2");
        assert_eq!(
            ks,
            vec![
                TokenKind::Number,
                TokenKind::Infix(InfixOp::To),
                TokenKind::Number,
                TokenKind::Infix(InfixOp::Step),
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_comparison_operators() {
        let ks = kinds("a <> b <= c >= d");
        assert!(ks.contains(&TokenKind::Infix(InfixOp::NotEq)));
        assert!(ks.contains(&TokenKind::Infix(InfixOp::LtEq)));
        assert!(ks.contains(&TokenKind::Infix(InfixOp::GtEq)));
    }

    #[test]
    fn string_escapes() {
        let tokens = Lexer::new(r#""a\nb""#).tokenize().unwrap();
        assert_eq!(tokens[0].text, "a\nb");
    }

    #[test]
    fn unterminated_string_reports_error() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedString { .. }));
    }

    #[test]
    fn invalid_escape_reports_error() {
        let err = Lexer::new(r#""a\qb""#).tokenize().unwrap_err();
        assert!(matches!(err, LexError::InvalidEscapeSequence { ch: 'q', .. }));
    }

    #[test]
    fn token_ranges_cover_source_without_gaps_in_significant_tokens() {
        let tokens = Lexer::new("define x 1").tokenize().unwrap();
        let significant: Vec<_> = tokens.iter().filter(|t| t.kind != TokenKind::Eof).collect();
        assert_eq!(&significant[0].text, "define");
        assert_eq!(significant[0].span, Span::new(0, 6));
    }
}
