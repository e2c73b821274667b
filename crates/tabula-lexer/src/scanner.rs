// Copyright (C) 2026 The Tabula Authors.
// This file is part of the tabula interpreter.

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! The tabula lexical scanner (spec §4.2).
//!
//! Grounded in `original_source/lexical/analyzer.py`: a one-character
//! lookahead buffer, classifiers tried in a fixed order, and the same
//! four configurable limits.

use tabula_errors::LexError;
use tabula_span::Position;

use crate::source::{PositionedChars, RawSource};
use crate::token::{keyword, Token, TokenKind};

/// Configurable scanner limits (spec §4.2). Defaults match the reference
/// implementation's `default_options`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScannerLimits {
    pub max_string_size: usize,
    pub max_identifier_length: usize,
    pub max_number_value: f64,
    pub max_decimal_precision: usize,
}

impl Default for ScannerLimits {
    fn default() -> Self {
        Self {
            max_string_size: 1024,
            max_identifier_length: 256,
            max_number_value: 2_147_483_647.0,
            max_decimal_precision: 8,
        }
    }
}

/// Scans a [`PositionedChars`] source into a [`Token`] stream.
///
/// Maintains one character of lookahead in `buffer`: at the start of
/// every `next_token` call, `buffer` holds a character that has been read
/// but not yet classified.
pub struct Scanner<S> {
    chars: PositionedChars<S>,
    buffer: Option<char>,
    buffer_pos: Position,
    limits: ScannerLimits,
}

impl<S: RawSource> Scanner<S> {
    pub fn new(source: S) -> Self {
        Self::with_limits(source, ScannerLimits::default())
    }

    pub fn with_limits(source: S, limits: ScannerLimits) -> Self {
        let mut chars = PositionedChars::new(source);
        let buffer = chars.next_char();
        let buffer_pos = chars.position();
        Self { chars, buffer, buffer_pos, limits }
    }

    fn advance(&mut self) {
        self.buffer = self.chars.next_char();
        self.buffer_pos = self.chars.position();
    }

    fn current(&self) -> Option<char> {
        self.buffer
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current() {
                Some(c) if c.is_whitespace() => self.advance(),
                Some('#') => {
                    while !matches!(self.current(), Some('\n') | None) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Returns the next token. Once the source is exhausted this
    /// perpetually yields [`TokenKind::Eot`] (testable property #2).
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments();

        let pos = self.buffer_pos;
        let Some(c) = self.current() else {
            return Ok(Token::new(TokenKind::Eot, "", pos));
        };

        if let Some(tok) = self.try_extensible(pos)? {
            tracing::trace!(kind = ?tok.kind, %pos, "scanned token");
            return Ok(tok);
        }
        if let Some(tok) = self.try_single_char(pos) {
            tracing::trace!(kind = ?tok.kind, %pos, "scanned token");
            return Ok(tok);
        }
        if c.is_ascii_digit() {
            return self.scan_number(pos);
        }
        if c == '"' {
            return self.scan_string(pos);
        }
        if c.is_alphabetic() {
            return self.scan_identifier(pos);
        }

        tracing::warn!(%c, %pos, "invalid token");
        Err(LexError::InvalidToken { ch: c, pos })
    }

    fn try_extensible(&mut self, pos: Position) -> Result<Option<Token>, LexError> {
        let primary = match self.current() {
            Some('<') => TokenKind::Lt,
            Some('>') => TokenKind::Gt,
            Some('=') => TokenKind::Assign,
            Some('!') => TokenKind::Bang,
            _ => return Ok(None),
        };
        self.advance();
        if matches!(self.current(), Some('=')) {
            self.advance();
            let (kind, lexeme) = match primary {
                TokenKind::Lt => (TokenKind::Le, "<="),
                TokenKind::Gt => (TokenKind::Ge, ">="),
                TokenKind::Assign => (TokenKind::EqEq, "=="),
                TokenKind::Bang => (TokenKind::NotEq, "!="),
                _ => unreachable!(),
            };
            return Ok(Some(Token::new(kind, lexeme, pos)));
        }
        let lexeme = primary.to_string();
        Ok(Some(Token::new(primary, lexeme, pos)))
    }

    fn try_single_char(&mut self, pos: Position) -> Option<Token> {
        let kind = match self.current()? {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            _ => return None,
        };
        let lexeme = kind.to_string();
        self.advance();
        Some(Token::new(kind, lexeme, pos))
    }

    fn scan_number(&mut self, pos: Position) -> Result<Token, LexError> {
        if self.current() == Some('0') {
            self.advance();
            if matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                return Err(LexError::InvalidNumber { pos });
            }
            let value = if self.current() == Some('.') { self.scan_decimal_part(pos)? } else { 0.0 };
            return Ok(Token::new(TokenKind::Number(value), format!("{value}"), pos));
        }

        let mut value = 0.0_f64;
        while let Some(c) = self.current().filter(|c| c.is_ascii_digit()) {
            value = value * 10.0 + (c as u32 - '0' as u32) as f64;
            if value >= self.limits.max_number_value {
                return Err(LexError::LargeNumber { limit: self.limits.max_number_value, pos });
            }
            self.advance();
        }
        if self.current() == Some('.') {
            value += self.scan_decimal_part(pos)?;
        }
        Ok(Token::new(TokenKind::Number(value), format!("{value}"), pos))
    }

    fn scan_decimal_part(&mut self, pos: Position) -> Result<f64, LexError> {
        self.advance(); // consume '.'
        let mut value = 0.0_f64;
        let mut digits = 0usize;
        while let Some(c) = self.current().filter(|c| c.is_ascii_digit()) {
            digits += 1;
            if digits > self.limits.max_decimal_precision {
                return Err(LexError::LargeDecimalPart { limit: self.limits.max_decimal_precision, pos });
            }
            value = value * 10.0 + (c as u32 - '0' as u32) as f64;
            self.advance();
        }
        if digits == 0 {
            return Err(LexError::InvalidNumber { pos });
        }
        Ok(value / 10f64.powi(digits as i32))
    }

    fn scan_string(&mut self, pos: Position) -> Result<Token, LexError> {
        self.advance(); // consume opening quote
        let mut content = String::new();
        let mut len = 0usize;
        loop {
            match self.current() {
                None => return Err(LexError::InvalidString { pos }),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('$') => {
                    self.advance();
                    match self.current() {
                        None => return Err(LexError::InvalidString { pos }),
                        Some(escaped) => {
                            content.push(escaped);
                            self.advance();
                        }
                    }
                }
                Some(c) => {
                    content.push(c);
                    self.advance();
                }
            }
            len += 1;
            if len > self.limits.max_string_size {
                return Err(LexError::LargeString { limit: self.limits.max_string_size, pos });
            }
        }
        Ok(Token::new(TokenKind::StringLit(content.clone()), content, pos))
    }

    fn scan_identifier(&mut self, pos: Position) -> Result<Token, LexError> {
        let mut ident = String::new();
        while let Some(c) = self.current().filter(|c| c.is_alphanumeric() || *c == '_') {
            ident.push(c);
            if ident.len() > self.limits.max_identifier_length {
                return Err(LexError::LargeIdentifier { limit: self.limits.max_identifier_length, pos });
            }
            self.advance();
        }
        let kind = keyword(&ident).unwrap_or(TokenKind::Identifier(ident.clone()));
        Ok(Token::new(kind, ident, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StrSource;

    fn tokens(src: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(StrSource::new(src));
        let mut out = Vec::new();
        loop {
            let tok = scanner.next_token().expect("scan ok");
            let eot = tok.is_eot();
            out.push(tok.kind);
            if eot {
                break;
            }
        }
        out
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            tokens("if else until return and or not foo"),
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::Until,
                TokenKind::Return,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Identifier("foo".into()),
                TokenKind::Eot,
            ]
        );
    }

    #[test]
    fn extensible_operators() {
        assert_eq!(
            tokens("< <= > >= = == ! !="),
            vec![
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::Assign,
                TokenKind::EqEq,
                TokenKind::Bang,
                TokenKind::NotEq,
                TokenKind::Eot,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            tokens("0 3 3.14 0.5"),
            vec![
                TokenKind::Number(0.0),
                TokenKind::Number(3.0),
                TokenKind::Number(3.14),
                TokenKind::Number(0.5),
                TokenKind::Eot,
            ]
        );
    }

    #[test]
    fn leading_zero_followed_by_digit_is_invalid() {
        let mut scanner = Scanner::new(StrSource::new("01"));
        assert!(matches!(scanner.next_token(), Err(LexError::InvalidNumber { .. })));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(tokens("\"a$\"b$$c\""), vec![TokenKind::StringLit("a\"b$c".into()), TokenKind::Eot]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut scanner = Scanner::new(StrSource::new("\"abc"));
        assert!(matches!(scanner.next_token(), Err(LexError::InvalidString { .. })));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(tokens("1 # a comment\n2"), vec![TokenKind::Number(1.0), TokenKind::Number(2.0), TokenKind::Eot]);
    }

    #[test]
    fn eot_is_perpetual() {
        let mut scanner = Scanner::new(StrSource::new(""));
        for _ in 0..3 {
            assert!(scanner.next_token().unwrap().is_eot());
        }
    }

    #[test]
    fn identifier_length_limit() {
        let long = "a".repeat(300);
        let mut scanner =
            Scanner::with_limits(StrSource::new(&long), ScannerLimits { max_identifier_length: 256, ..ScannerLimits::default() });
        assert!(matches!(scanner.next_token(), Err(LexError::LargeIdentifier { .. })));
    }
}
