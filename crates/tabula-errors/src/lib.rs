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

//! Structured diagnostics for the tabula pipeline.
//!
//! Each pipeline stage gets its own `thiserror` enum (mirroring the
//! teacher's one-crate-per-family `leo-errors` convention, scaled down to a
//! single crate since this project's error surface is small). Rendering
//! error values into human messages is left to the caller (the CLI, or a
//! test harness) — these types only carry the structured facts.

use std::fmt;
use tabula_span::Position;

pub type Result<T> = std::result::Result<T, Error>;

/// Lexical errors, each positioned at the offending character.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum LexError {
    #[error("{pos}: invalid token starting at {ch:?}")]
    InvalidToken { ch: char, pos: Position },

    #[error("{pos}: invalid number literal")]
    InvalidNumber { pos: Position },

    #[error("{pos}: invalid string literal")]
    InvalidString { pos: Position },

    #[error("{pos}: string literal exceeds the maximum length of {limit}")]
    LargeString { limit: usize, pos: Position },

    #[error("{pos}: identifier exceeds the maximum length of {limit}")]
    LargeIdentifier { limit: usize, pos: Position },

    #[error("{pos}: number literal exceeds the maximum value of {limit}")]
    LargeNumber { limit: f64, pos: Position },

    #[error("{pos}: decimal part exceeds the maximum precision of {limit} digits")]
    LargeDecimalPart { limit: usize, pos: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match *self {
            LexError::InvalidToken { pos, .. }
            | LexError::InvalidNumber { pos }
            | LexError::InvalidString { pos }
            | LexError::LargeString { pos, .. }
            | LexError::LargeIdentifier { pos, .. }
            | LexError::LargeNumber { pos, .. }
            | LexError::LargeDecimalPart { pos, .. } => pos,
        }
    }
}

/// The syntactic production a parse error occurred while recognising.
/// Carried alongside the offending token so a renderer can say
/// "expected X while parsing a Y".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseContext {
    Program,
    FunctionDefinition,
    Params,
    StatementBlock,
    IfStatement,
    UntilStatement,
    ReturnStatement,
    AssignOrCall,
    IndexOperator,
    Selector,
    OrCondition,
    AndCondition,
    RelCondition,
    Additive,
    Multiplicative,
    Atomic,
    MatrixLiteral,
}

impl fmt::Display for ParseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseContext::Program => "program",
            ParseContext::FunctionDefinition => "function definition",
            ParseContext::Params => "parameter list",
            ParseContext::StatementBlock => "statement block",
            ParseContext::IfStatement => "if statement",
            ParseContext::UntilStatement => "until statement",
            ParseContext::ReturnStatement => "return statement",
            ParseContext::AssignOrCall => "assignment or call",
            ParseContext::IndexOperator => "index operator",
            ParseContext::Selector => "selector",
            ParseContext::OrCondition => "or-condition",
            ParseContext::AndCondition => "and-condition",
            ParseContext::RelCondition => "relational condition",
            ParseContext::Additive => "additive expression",
            ParseContext::Multiplicative => "multiplicative expression",
            ParseContext::Atomic => "atomic expression",
            ParseContext::MatrixLiteral => "matrix literal",
        };
        f.write_str(s)
    }
}

/// Syntactic errors. `token` is the stringified offending token (the
/// parser crate owns the real `Token` type; errors stays decoupled from it
/// so lexer/parser can both depend on errors without a cycle).
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("{pos}: duplicate definition of function `{name}`")]
    FunctionDuplication { name: String, pos: Position },

    #[error("{pos}: unexpected token `{token}` while parsing {context}")]
    UnexpectedToken { token: String, context: ParseContext, pos: Position },

    #[error("{pos}: expected a condition while parsing {context}, found `{token}`")]
    MissingCondition { token: String, context: ParseContext, pos: Position },

    #[error("{pos}: expected an expression while parsing {context}, found `{token}`")]
    MissingExpression { token: String, context: ParseContext, pos: Position },

    #[error("{pos}: expected a statement block while parsing {context}, found `{token}`")]
    MissingStatementBlock { token: String, context: ParseContext, pos: Position },

    #[error("{pos}: expected an else-branch while parsing {context}, found `{token}`")]
    MissingElseStatement { token: String, context: ParseContext, pos: Position },

    #[error("{pos}: expected a selector (`:` or an expression) while parsing {context}, found `{token}`")]
    MissingSelector { token: String, context: ParseContext, pos: Position },

    #[error("{pos}: expected `{expected}`, found `{received}`")]
    TokenMismatch { expected: String, received: String, pos: Position },

    #[error("{pos}: expected bracket `{expected}`, found `{received}`")]
    MissingBracket { expected: String, received: String, pos: Position },

    #[error("{pos}: expected an identifier, found `{received}`")]
    MissingIdentifier { received: String, pos: Position },
}

impl ParseError {
    pub fn position(&self) -> Position {
        match self {
            ParseError::FunctionDuplication { pos, .. }
            | ParseError::UnexpectedToken { pos, .. }
            | ParseError::MissingCondition { pos, .. }
            | ParseError::MissingExpression { pos, .. }
            | ParseError::MissingStatementBlock { pos, .. }
            | ParseError::MissingElseStatement { pos, .. }
            | ParseError::MissingSelector { pos, .. }
            | ParseError::TokenMismatch { pos, .. }
            | ParseError::MissingBracket { pos, .. }
            | ParseError::MissingIdentifier { pos, .. } => *pos,
        }
    }
}

/// The runtime-error kinds from spec §7 "Execution" family.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum EvalErrorKind {
    #[error("program has no `main` function")]
    MissingMain,

    #[error("call to undefined function `{0}`")]
    UndefinedFunction(String),

    #[error("function `{name}` expects {expected} argument(s), got {got}")]
    FunctionArgumentsMismatch { name: String, expected: usize, got: usize },

    #[error("type mismatch")]
    TypesMismatch,

    #[error("matrix dimensions mismatch")]
    MatrixDimensionsMismatch,

    #[error("division by zero")]
    ZeroDivision,

    #[error("invalid type for this operation")]
    InvalidType,

    #[error("invalid matrix literal: rows have inconsistent lengths")]
    InvalidMatrixLiteral,

    #[error("index out of range")]
    Index,

    #[error("use of undefined variable")]
    UndefinedVariable,
}

/// An execution error accumulates a human-readable stack trace as it
/// propagates out through nested `evaluate_*` calls, one frame per
/// boundary crossed, innermost first (see spec §7, §9 "Stack-trace
/// accumulation").
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub pos: Option<Position>,
    pub frames: Vec<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        Self { kind, pos: None, frames: Vec::new() }
    }

    pub fn at(kind: EvalErrorKind, pos: Position) -> Self {
        Self { kind, pos: Some(pos), frames: Vec::new() }
    }

    /// Appends one stack frame and returns `self`, for use at each
    /// `evaluate_*` boundary: `eval_foo().map_err(|e| e.with_frame("foo"))`.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{pos}: {}", self.kind)?,
            None => write!(f, "{}", self.kind)?,
        }
        for frame in &self.frames {
            write!(f, "\n    while {frame}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

/// Unifies the three error families at the pipeline boundary (the CLI, or
/// a test harness), matching the teacher's crate-wide `leo_errors::Error`.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Eval(#[from] EvalError),
}
