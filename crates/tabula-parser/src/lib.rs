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

//! Recursive-descent parser for the tabula language (spec §4.3).
//!
//! Single-token lookahead: `current()` always holds a token that has
//! been classified but not yet consumed, mirroring the scanner's own
//! one-character lookahead discipline.

use indexmap::IndexMap;

use tabula_ast::*;
use tabula_errors::{Error, ParseContext, ParseError};
use tabula_lexer::{RawSource, Scanner, StrSource, Token, TokenKind};
use tabula_span::Position;

/// Parses a whole program from source text.
pub fn parse(source: &str) -> Result<Program, Error> {
    parse_source(StrSource::new(source))
}

/// Parses a whole program from an arbitrary [`RawSource`].
pub fn parse_source<S: RawSource>(source: S) -> Result<Program, Error> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    loop {
        let tok = scanner.next_token()?;
        let eot = tok.is_eot();
        tokens.push(tok);
        if eot {
            break;
        }
    }
    Ok(Parser::new(tokens).parse_program()?)
}

struct Parser {
    tokens: Vec<Token>,
    idx: usize,
}

/// Token kinds that can open an [`Expr::pos`]-anchored atomic expression:
/// unary minus, an identifier/call, a literal, or a parenthesised group.
fn starts_atomic(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Minus
            | TokenKind::Identifier(_)
            | TokenKind::Number(_)
            | TokenKind::StringLit(_)
            | TokenKind::LParen
            | TokenKind::LBracket
    )
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        assert!(!tokens.is_empty() && tokens.last().unwrap().is_eot());
        Self { tokens, idx: 0 }
    }

    fn token(&self) -> &Token {
        &self.tokens[self.idx]
    }

    fn kind(&self) -> &TokenKind {
        &self.token().kind
    }

    fn pos(&self) -> Position {
        self.token().pos
    }

    /// Advances past the current token, once the end of the stream is
    /// reached further calls are no-ops and `kind()` keeps reporting `Eot`.
    fn bump(&mut self) {
        if self.idx + 1 < self.tokens.len() {
            self.idx += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.kind() == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(ParseError::TokenMismatch { expected: kind.to_string(), received: self.kind().to_string(), pos: self.pos() })
        }
    }

    fn expect_bracket(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(ParseError::MissingBracket { expected: kind.to_string(), received: self.kind().to_string(), pos: self.pos() })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Identifier(name) = self.kind().clone() {
            self.bump();
            Ok(name)
        } else {
            Err(ParseError::MissingIdentifier { received: self.kind().to_string(), pos: self.pos() })
        }
    }

    // ---- Program ----

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut functions = IndexMap::new();
        while !matches!(self.kind(), TokenKind::Eot) {
            let def = self.parse_function_def()?;
            if functions.contains_key(&def.name) {
                return Err(ParseError::FunctionDuplication { name: def.name, pos: def.pos });
            }
            functions.insert(def.name.clone(), def);
        }
        tracing::debug!(count = functions.len(), "parsed program");
        Ok(Program { functions })
    }

    fn parse_function_def(&mut self) -> Result<FunctionDef, ParseError> {
        let pos = self.pos();
        let name = self.expect_identifier()?;
        self.expect_bracket(TokenKind::LParen)?;
        let params = if self.check(&TokenKind::RParen) { Vec::new() } else { self.parse_params()? };
        self.expect_bracket(TokenKind::RParen)?;
        let body = self.parse_statement_block()?;
        tracing::trace!(%name, params = params.len(), "parsed function definition");
        Ok(FunctionDef { name, params, body, pos })
    }

    fn parse_params(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = vec![self.expect_identifier()?];
        while self.eat(&TokenKind::Comma) {
            params.push(self.expect_identifier()?);
        }
        Ok(params)
    }

    // ---- Statements ----

    fn parse_statement_block(&mut self) -> Result<StatementBlock, ParseError> {
        self.expect_bracket(TokenKind::LBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !matches!(self.kind(), TokenKind::Eot) {
            statements.push(self.parse_statement()?);
        }
        self.expect_bracket(TokenKind::RBrace)?;
        Ok(StatementBlock { statements })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.kind() {
            TokenKind::If => Ok(Statement::If(self.parse_if_statement()?)),
            TokenKind::Until => Ok(Statement::Until(self.parse_until_statement()?)),
            TokenKind::Return => Ok(Statement::Return(self.parse_return_statement()?)),
            TokenKind::LBrace => Ok(Statement::Block(self.parse_statement_block()?)),
            TokenKind::Identifier(_) => self.parse_assign_or_call(),
            _ => Err(ParseError::UnexpectedToken {
                token: self.kind().to_string(),
                context: ParseContext::StatementBlock,
                pos: self.pos(),
            }),
        }
    }

    fn parse_if_statement(&mut self) -> Result<IfStatement, ParseError> {
        let pos = self.pos();
        self.expect(TokenKind::If)?;
        self.expect_bracket(TokenKind::LParen)?;
        let cond = self.parse_or_condition(ParseContext::IfStatement)?;
        self.expect_bracket(TokenKind::RParen)?;
        let then = self.parse_statement_block()?;
        let else_ = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Box::new(Statement::If(self.parse_if_statement()?)))
            } else if self.check(&TokenKind::LBrace) {
                Some(Box::new(Statement::Block(self.parse_statement_block()?)))
            } else {
                return Err(ParseError::MissingElseStatement {
                    token: self.kind().to_string(),
                    context: ParseContext::IfStatement,
                    pos: self.pos(),
                });
            }
        } else {
            None
        };
        Ok(IfStatement { cond, then, else_, pos })
    }

    fn parse_until_statement(&mut self) -> Result<UntilStatement, ParseError> {
        let pos = self.pos();
        self.expect(TokenKind::Until)?;
        self.expect_bracket(TokenKind::LParen)?;
        let cond = self.parse_or_condition(ParseContext::UntilStatement)?;
        self.expect_bracket(TokenKind::RParen)?;
        let body = self.parse_statement_block()?;
        Ok(UntilStatement { cond, body, pos })
    }

    fn parse_return_statement(&mut self) -> Result<ReturnStatement, ParseError> {
        let pos = self.pos();
        self.expect(TokenKind::Return)?;
        let expr =
            if starts_atomic(self.kind()) { Some(self.parse_additive(ParseContext::ReturnStatement)?) } else { None };
        Ok(ReturnStatement { expr, pos })
    }

    fn parse_assign_or_call(&mut self) -> Result<Statement, ParseError> {
        let pos = self.pos();
        let name = self.expect_identifier()?;
        if self.eat(&TokenKind::LParen) {
            let args = self.parse_args()?;
            self.expect_bracket(TokenKind::RParen)?;
            return Ok(Statement::Call(CallExpr { name, args, pos }));
        }
        let index = if self.check(&TokenKind::LBracket) { Some(self.parse_index_op()?) } else { None };
        self.expect(TokenKind::Assign)?;
        let rhs = self.parse_additive(ParseContext::AssignOrCall)?;
        Ok(Statement::Assign(AssignStatement { target: IdentifierRef { name, index, pos }, rhs, pos }))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        if self.check(&TokenKind::RParen) {
            return Ok(Vec::new());
        }
        let mut args = vec![self.parse_additive(ParseContext::Atomic)?];
        while self.eat(&TokenKind::Comma) {
            args.push(self.parse_additive(ParseContext::Atomic)?);
        }
        Ok(args)
    }

    fn parse_index_op(&mut self) -> Result<IndexOp, ParseError> {
        self.expect_bracket(TokenKind::LBracket)?;
        let first = Box::new(self.parse_selector()?);
        self.expect(TokenKind::Comma)?;
        let second = Box::new(self.parse_selector()?);
        self.expect_bracket(TokenKind::RBracket)?;
        Ok(IndexOp { first, second })
    }

    fn parse_selector(&mut self) -> Result<Expr, ParseError> {
        let pos = self.pos();
        if self.eat(&TokenKind::Colon) {
            return Ok(Expr::DotsSelect(pos));
        }
        if !starts_atomic(self.kind()) {
            return Err(ParseError::MissingSelector {
                token: self.kind().to_string(),
                context: ParseContext::IndexOperator,
                pos,
            });
        }
        self.parse_additive(ParseContext::Selector)
    }

    // ---- Conditions ----

    fn parse_or_condition(&mut self, context: ParseContext) -> Result<Condition, ParseError> {
        let mut conds = vec![self.parse_and_condition(context)?];
        while self.eat(&TokenKind::Or) {
            conds.push(self.parse_and_condition(context)?);
        }
        Ok(if conds.len() == 1 { conds.pop().unwrap() } else { Condition::Or(conds) })
    }

    fn parse_and_condition(&mut self, context: ParseContext) -> Result<Condition, ParseError> {
        let mut conds = vec![self.parse_rel_condition(context)?];
        while self.eat(&TokenKind::And) {
            conds.push(self.parse_rel_condition(context)?);
        }
        Ok(if conds.len() == 1 { conds.pop().unwrap() } else { Condition::And(conds) })
    }

    fn parse_rel_condition(&mut self, context: ParseContext) -> Result<Condition, ParseError> {
        let negated = self.eat(&TokenKind::Not);
        let left = self.parse_additive(context)?;
        let op = match self.kind() {
            TokenKind::Lt => Some(CmpOp::Lt),
            TokenKind::Le => Some(CmpOp::Le),
            TokenKind::Gt => Some(CmpOp::Gt),
            TokenKind::Ge => Some(CmpOp::Ge),
            TokenKind::EqEq => Some(CmpOp::Eq),
            TokenKind::NotEq => Some(CmpOp::Ne),
            _ => None,
        };
        let right = match op {
            Some(_) => {
                self.bump();
                Some(self.parse_additive(context)?)
            }
            None => None,
        };
        Ok(Condition::Rel(RelCondition { negated, left, op, right }))
    }

    // ---- Expressions ----

    fn parse_additive(&mut self, context: ParseContext) -> Result<Expr, ParseError> {
        let mut terms = vec![self.parse_multiplicative(context)?];
        let mut ops = Vec::new();
        loop {
            let op = match self.kind() {
                TokenKind::Plus => AddOp::Add,
                TokenKind::Minus => AddOp::Sub,
                _ => break,
            };
            self.bump();
            ops.push(op);
            terms.push(self.parse_multiplicative(context)?);
        }
        Ok(if terms.len() == 1 { terms.pop().unwrap() } else { Expr::Additive { terms, ops } })
    }

    fn parse_multiplicative(&mut self, context: ParseContext) -> Result<Expr, ParseError> {
        let mut terms = vec![self.parse_atomic(context)?];
        let mut ops = Vec::new();
        loop {
            let op = match self.kind() {
                TokenKind::Star => MulOp::Mul,
                TokenKind::Slash => MulOp::Div,
                _ => break,
            };
            self.bump();
            ops.push(op);
            terms.push(self.parse_atomic(context)?);
        }
        Ok(if terms.len() == 1 { terms.pop().unwrap() } else { Expr::Multiplicative { terms, ops } })
    }

    fn parse_atomic(&mut self, context: ParseContext) -> Result<Expr, ParseError> {
        let pos = self.pos();
        let negated = self.eat(&TokenKind::Minus);
        let inner = match self.kind().clone() {
            TokenKind::Identifier(name) => {
                self.bump();
                Some(self.parse_identifier_tail(name, pos)?)
            }
            TokenKind::LParen => {
                self.bump();
                Some(self.parse_parenthesised_or_condition()?)
            }
            TokenKind::Number(n) => {
                self.bump();
                Some(Expr::NumberLit(n, pos))
            }
            TokenKind::StringLit(s) => {
                self.bump();
                Some(Expr::StringLit(s, pos))
            }
            TokenKind::LBracket => Some(self.parse_matrix_literal(pos)?),
            _ => None,
        };
        match inner {
            Some(e) => Ok(if negated { Expr::Negated { inner: Box::new(e), pos } } else { e }),
            None if negated => {
                Err(ParseError::UnexpectedToken { token: self.kind().to_string(), context: ParseContext::Atomic, pos })
            }
            None => Err(ParseError::MissingExpression { token: self.kind().to_string(), context, pos }),
        }
    }

    fn parse_identifier_tail(&mut self, name: String, pos: Position) -> Result<Expr, ParseError> {
        if self.eat(&TokenKind::LParen) {
            let args = self.parse_args()?;
            self.expect_bracket(TokenKind::RParen)?;
            return Ok(Expr::Call(CallExpr { name, args, pos }));
        }
        let index = if self.check(&TokenKind::LBracket) { Some(self.parse_index_op()?) } else { None };
        Ok(Expr::IdentifierRef(IdentifierRef { name, index, pos }))
    }

    /// Parses `"(" OrCondition ")"`. A condition that never used a
    /// comparison or boolean connective collapses straight to its
    /// left-hand expression (a bare grouping); anything else is carried
    /// forward as [`Expr::Condition`] for the evaluator to coerce to a
    /// number where an expression is expected (spec §4.3 `Atomic`).
    fn parse_parenthesised_or_condition(&mut self) -> Result<Expr, ParseError> {
        let cond = self.parse_or_condition(ParseContext::OrCondition)?;
        self.expect_bracket(TokenKind::RParen)?;
        Ok(match cond {
            Condition::Rel(RelCondition { negated: false, left, op: None, right: None }) => left,
            other => Expr::Condition(Box::new(other)),
        })
    }

    fn parse_matrix_literal(&mut self, pos: Position) -> Result<Expr, ParseError> {
        self.expect_bracket(TokenKind::LBracket)?;
        let mut cells = vec![self.parse_additive(ParseContext::MatrixLiteral)?];
        let mut separators = Vec::new();
        loop {
            let sep = match self.kind() {
                TokenKind::Comma => MatrixSep::Comma,
                TokenKind::Semicolon => MatrixSep::Semicolon,
                _ => break,
            };
            self.bump();
            separators.push(sep);
            cells.push(self.parse_additive(ParseContext::MatrixLiteral)?);
        }
        self.expect_bracket(TokenKind::RBracket)?;
        Ok(Expr::MatrixLit { cells, separators, pos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(src: &str) -> Program {
        parse(src).expect("parse ok")
    }

    #[test]
    fn parses_minimal_main() {
        let p = program("main() { return 1 }");
        assert_eq!(p.functions.len(), 1);
        assert!(p.functions.contains_key("main"));
    }

    #[test]
    fn parses_params_and_call() {
        let p = program("helper(a, b) { return a + b } main() { return helper(1, 2) }");
        let helper = &p.functions["helper"];
        assert_eq!(helper.params, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn additive_chain_does_not_nest_singletons() {
        let p = program("main() { return 1 }");
        let ret = &p.functions["main"].body.statements[0];
        match ret {
            Statement::Return(r) => assert!(matches!(r.expr, Some(Expr::NumberLit(1.0, _)))),
            _ => panic!("expected return"),
        }
    }

    #[test]
    fn parenthesised_plain_expression_is_not_wrapped_in_condition() {
        let p = program("main() { return (1 + 2) }");
        match &p.functions["main"].body.statements[0] {
            Statement::Return(r) => assert!(matches!(r.expr, Some(Expr::Additive { .. }))),
            _ => panic!("expected return"),
        }
    }

    #[test]
    fn parenthesised_comparison_becomes_condition_expr() {
        let p = program("main() { return (1 < 2) }");
        match &p.functions["main"].body.statements[0] {
            Statement::Return(r) => assert!(matches!(r.expr, Some(Expr::Condition(_)))),
            _ => panic!("expected return"),
        }
    }

    #[test]
    fn if_else_if_chain() {
        let p = program("main() { if (1 < 2) { return 1 } else if (2 < 3) { return 2 } else { return 3 } }");
        match &p.functions["main"].body.statements[0] {
            Statement::If(s) => {
                assert!(matches!(s.else_.as_deref(), Some(Statement::If(_))));
            }
            _ => panic!("expected if"),
        }
    }

    #[test]
    fn matrix_literal_and_index_assignment() {
        let p = program("main() { m = [1, 2; 3, 4] m[0,:] = [5, 6] return m }");
        let stmts = &p.functions["main"].body.statements;
        assert!(matches!(stmts[0], Statement::Assign(ref a) if matches!(a.rhs, Expr::MatrixLit { .. })));
        match &stmts[1] {
            Statement::Assign(a) => assert!(a.target.index.is_some()),
            _ => panic!("expected assignment"),
        }
    }

    #[test]
    fn duplicate_function_is_an_error() {
        let err = parse("f() { return 1 } f() { return 2 }");
        assert!(matches!(err, Err(Error::Parse(ParseError::FunctionDuplication { .. }))));
    }

    #[test]
    fn missing_expression_after_operator_is_an_error() {
        let err = parse("main() { return 1 + }");
        assert!(matches!(err, Err(Error::Parse(ParseError::MissingExpression { .. }))));
    }

    #[test]
    fn until_loop_parses() {
        let p = program("main() { i = 0 until (i < 10) { i = i + 1 } return i }");
        assert!(matches!(p.functions["main"].body.statements[1], Statement::Until(_)));
    }
}
