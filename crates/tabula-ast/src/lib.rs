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

//! The abstract syntax tree for the tabula language (spec §3).
//!
//! A closed algebraic data type, built once by the parser and walked
//! (never mutated) by the evaluator — see spec §9 "Visitor pattern":
//! rather than the reference's `accept`-based visitor, this is a plain
//! sum type matched over in `tabula-eval`, giving exhaustiveness checking
//! for free.

use indexmap::IndexMap;
use tabula_span::Position;

/// A whole source file: the insertion-ordered map of function
/// definitions the parser built (spec §3 `Program`).
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub functions: IndexMap<String, FunctionDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: StatementBlock,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementBlock {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    If(IfStatement),
    Until(UntilStatement),
    Return(ReturnStatement),
    Assign(AssignStatement),
    Call(CallExpr),
    Block(StatementBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub cond: Condition,
    pub then: StatementBlock,
    pub else_: Option<Box<Statement>>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UntilStatement {
    pub cond: Condition,
    pub body: StatementBlock,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub expr: Option<Expr>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStatement {
    pub target: IdentifierRef,
    pub rhs: Expr,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    pub pos: Position,
}

/// The short-circuit boolean grammar, in precedence order `or` < `and` <
/// relational (spec §4.3). A chain of length 1 at any of these three
/// levels is stored as its inner node directly — the parser never wraps
/// a lone operand in `Or`/`And` (spec §3 invariant, testable property #3).
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Or(Vec<Condition>),
    And(Vec<Condition>),
    Rel(RelCondition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelCondition {
    pub negated: bool,
    pub left: Expr,
    pub op: Option<CmpOp>,
    pub right: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulOp {
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSep {
    Comma,
    Semicolon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `terms.len() == ops.len() + 1` (spec §3 invariant). A singleton
    /// chain collapses to its one term instead of wrapping it here.
    Additive { terms: Vec<Expr>, ops: Vec<AddOp> },
    Multiplicative { terms: Vec<Expr>, ops: Vec<MulOp> },
    Negated { inner: Box<Expr>, pos: Position },
    Call(CallExpr),
    IdentifierRef(IdentifierRef),
    NumberLit(f64, Position),
    StringLit(String, Position),
    MatrixLit { cells: Vec<Expr>, separators: Vec<MatrixSep>, pos: Position },
    /// The full-axis selector `:`, valid only inside an [`IndexOp`].
    DotsSelect(Position),
    /// A parenthesised `OrCondition` used in atomic-expression position
    /// (spec §4.3 `Atomic = ... | "(" OrCondition ")" | ...`), e.g.
    /// `1 + (a > b)`. The parser only produces this when the parenthesised
    /// condition is not a trivial single comparison-free operand — a bare
    /// `(a)` collapses straight to `a` like any other grouping, matching
    /// the singleton-chain invariant.
    Condition(Box<Condition>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentifierRef {
    pub name: String,
    pub index: Option<IndexOp>,
    pub pos: Position,
}

/// `m[first, second]` (spec §4.4.5). Each selector is either `:`
/// ([`Expr::DotsSelect`]) or an arbitrary expression expected to
/// evaluate to a NUMBER.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexOp {
    pub first: Box<Expr>,
    pub second: Box<Expr>,
}

impl Expr {
    /// The position of this expression's leftmost token, used to anchor
    /// diagnostics raised while evaluating it.
    pub fn pos(&self) -> Position {
        match self {
            Expr::Additive { terms, .. } | Expr::Multiplicative { terms, .. } => {
                terms.first().map(Expr::pos).unwrap_or_default()
            }
            Expr::Negated { pos, .. }
            | Expr::NumberLit(_, pos)
            | Expr::StringLit(_, pos)
            | Expr::MatrixLit { pos, .. }
            | Expr::DotsSelect(pos) => *pos,
            Expr::Call(c) => c.pos,
            Expr::IdentifierRef(i) => i.pos,
            Expr::Condition(c) => c.pos(),
        }
    }
}

impl Condition {
    pub fn pos(&self) -> Position {
        match self {
            Condition::Or(xs) | Condition::And(xs) => xs.first().map(Condition::pos).unwrap_or_default(),
            Condition::Rel(r) => r.left.pos(),
        }
    }
}
