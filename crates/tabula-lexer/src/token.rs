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

//! The closed token set of the tabula language (spec §3, §6).

use std::fmt;

use tabula_span::Position;

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    Number(f64),
    StringLit(String),

    // Keywords.
    If,
    Else,
    Until,
    Return,
    And,
    Or,
    Not,

    // Comparison operators.
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,

    // Arithmetic operators.
    Plus,
    Minus,
    Star,
    Slash,

    // Brackets.
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,

    // Punctuation.
    Comma,
    Semicolon,
    Colon,
    Assign,
    /// The bare `!` symbol. Distinct from the `not` keyword: the grammar
    /// only ever consumes `!` as half of `!=`, but it remains a member of
    /// the closed token set per spec §3/§6.
    Bang,

    /// End of text. Perpetually re-emitted once the source is exhausted
    /// (spec §4.2, testable property #2).
    Eot,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        match self {
            Identifier(s) => write!(f, "{s}"),
            Number(n) => write!(f, "{n}"),
            StringLit(s) => write!(f, "\"{s}\""),
            If => write!(f, "if"),
            Else => write!(f, "else"),
            Until => write!(f, "until"),
            Return => write!(f, "return"),
            And => write!(f, "and"),
            Or => write!(f, "or"),
            Not => write!(f, "not"),
            Lt => write!(f, "<"),
            Le => write!(f, "<="),
            Gt => write!(f, ">"),
            Ge => write!(f, ">="),
            EqEq => write!(f, "=="),
            NotEq => write!(f, "!="),
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Star => write!(f, "*"),
            Slash => write!(f, "/"),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            LBrace => write!(f, "{{"),
            RBrace => write!(f, "}}"),
            LBracket => write!(f, "["),
            RBracket => write!(f, "]"),
            Comma => write!(f, ","),
            Semicolon => write!(f, ";"),
            Colon => write!(f, ":"),
            Assign => write!(f, "="),
            Bang => write!(f, "!"),
            Eot => write!(f, "<eot>"),
        }
    }
}

/// Maps recognised identifier text to its keyword [`TokenKind`], the
/// "final keyword lookup" step from spec §4.2 classifier 5.
pub fn keyword(text: &str) -> Option<TokenKind> {
    Some(match text {
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "until" => TokenKind::Until,
        "return" => TokenKind::Return,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        _ => return None,
    })
}

/// A positioned token (spec §3).
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Position) -> Self {
        Self { kind, lexeme: lexeme.into(), pos }
    }

    pub fn is_eot(&self) -> bool {
        matches!(self.kind, TokenKind::Eot)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' @ {}", self.kind, self.pos)
    }
}
