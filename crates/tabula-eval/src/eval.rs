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

//! Tree-walking evaluation (spec §4.4).

use std::rc::Rc;

use tabula_ast::{
    AssignStatement, CallExpr, Condition, Expr, FunctionDef, IdentifierRef, IfStatement, MatrixSep, Program,
    RelCondition, Statement, StatementBlock, UntilStatement,
};
use tabula_errors::{EvalError, EvalErrorKind};
use tabula_span::Position;

use crate::matrix::{Matrix, Selector};
use crate::ops;
use crate::scope::Stack;
use crate::stdlib;
use crate::value::{new_slot, Slot, Value};

/// Runs a parsed program: requires a zero-argument `main` and returns
/// whatever it returns (`UNDEFINED` if it falls off the end without a
/// `return`, per spec §4.4.1).
pub fn run_program(program: &Program) -> Result<Value, EvalError> {
    if !program.functions.contains_key("main") {
        return Err(EvalError::new(EvalErrorKind::MissingMain));
    }
    let mut interp = Interpreter { program, stack: Stack::new() };
    let result = interp.dispatch_call("main", Vec::new(), Position::default())?;
    Ok(result.borrow().clone())
}

pub struct Interpreter<'p> {
    program: &'p Program,
    stack: Stack,
}

/// What executing a statement (or a block of them) produced: either it
/// ran to completion, or a `return` fired partway through, carrying the
/// returned slot (spec §4.4.8 "the returns flag").
type Flow = Option<Slot>;

impl<'p> Interpreter<'p> {
    fn exec_block(&mut self, block: &StatementBlock) -> Result<Flow, EvalError> {
        self.stack.open_scope();
        for stmt in &block.statements {
            match self.exec_statement(stmt) {
                Ok(Some(slot)) => {
                    self.stack.close_scope();
                    return Ok(Some(slot));
                }
                Ok(None) => {}
                Err(e) => return Err(e),
            }
        }
        self.stack.close_scope();
        Ok(None)
    }

    fn exec_statement(&mut self, stmt: &Statement) -> Result<Flow, EvalError> {
        match stmt {
            Statement::If(s) => self.exec_if(s),
            Statement::Until(s) => self.exec_until(s),
            Statement::Return(s) => match &s.expr {
                Some(expr) => Ok(Some(self.eval_expr(expr)?)),
                None => Ok(Some(new_slot(Value::Undefined))),
            },
            Statement::Assign(s) => {
                self.exec_assign(s)?;
                Ok(None)
            }
            Statement::Call(c) => {
                self.eval_call(c)?;
                Ok(None)
            }
            Statement::Block(b) => self.exec_block(b),
        }
    }

    fn exec_if(&mut self, s: &IfStatement) -> Result<Flow, EvalError> {
        if self.eval_condition(&s.cond)? {
            self.exec_block(&s.then)
        } else if let Some(else_) = &s.else_ {
            self.exec_statement(else_)
        } else {
            Ok(None)
        }
    }

    fn exec_until(&mut self, s: &UntilStatement) -> Result<Flow, EvalError> {
        while self.eval_condition(&s.cond)? {
            if let Some(slot) = self.exec_block(&s.body)? {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    fn exec_assign(&mut self, s: &AssignStatement) -> Result<(), EvalError> {
        let rhs_slot = self.eval_expr(&s.rhs)?;
        match &s.target.index {
            None => {
                let existing = self.stack.get(&s.target.name);
                let existing_value = existing.borrow().clone();
                let rhs_value = rhs_slot.borrow().clone();
                ops::check_binary_types(&existing_value, &rhs_value, true).map_err(|k| EvalError::at(k, s.pos))?;
                self.stack.assign(&s.target.name, rhs_slot);
                Ok(())
            }
            Some(index) => {
                let target_slot = self.stack.get(&s.target.name);
                let matrix_rc = match &*target_slot.borrow() {
                    Value::Matrix(m) => Rc::clone(m),
                    _ => return Err(EvalError::at(EvalErrorKind::InvalidType, s.pos)),
                };
                let first = self.eval_selector(&index.first)?;
                let second = self.eval_selector(&index.second)?;
                let rhs_value = rhs_slot.borrow().clone();
                let (number, matrix) = match &rhs_value {
                    Value::Number(n) => (Some(*n), None),
                    Value::Matrix(m) => (None, Some(m.borrow().clone())),
                    _ => return Err(EvalError::at(EvalErrorKind::InvalidType, s.pos)),
                };
                matrix_rc
                    .borrow_mut()
                    .assign_index(first, second, number, matrix.as_ref())
                    .map_err(|k| EvalError::at(k, s.pos))?;
                Ok(())
            }
        }
    }

    fn eval_condition(&mut self, cond: &Condition) -> Result<bool, EvalError> {
        match cond {
            Condition::Or(parts) => {
                for part in parts {
                    if self.eval_condition(part)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Condition::And(parts) => {
                for part in parts {
                    if !self.eval_condition(part)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Condition::Rel(rel) => self.eval_rel_condition(rel),
        }
    }

    fn eval_rel_condition(&mut self, rel: &RelCondition) -> Result<bool, EvalError> {
        let pos = rel.left.pos();
        let left = self.eval_expr(&rel.left)?;
        let mut result = match (&rel.op, &rel.right) {
            (Some(op), Some(right_expr)) => {
                let right = self.eval_expr(right_expr)?;
                ops::compare(&left.borrow(), &right.borrow(), *op).map_err(|k| EvalError::at(k, pos))?
            }
            _ => ops::truthy(&left.borrow()).map_err(|k| EvalError::at(k, pos))?,
        };
        if rel.negated {
            result = !result;
        }
        Ok(result)
    }

    fn eval_selector(&mut self, expr: &Expr) -> Result<Selector, EvalError> {
        if let Expr::DotsSelect(_) = expr {
            return Ok(Selector::Dots);
        }
        let pos = expr.pos();
        let slot = self.eval_expr(expr)?;
        let n = match &*slot.borrow() {
            Value::Number(n) => *n,
            _ => return Err(EvalError::at(EvalErrorKind::InvalidType, pos)),
        };
        if n.fract() != 0.0 || n < 0.0 {
            return Err(EvalError::at(EvalErrorKind::Index, pos));
        }
        Ok(Selector::Index(n as usize))
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Slot, EvalError> {
        match expr {
            Expr::Additive { terms, ops: add_ops } => {
                let mut acc = self.eval_expr(&terms[0])?;
                for (term, op) in terms[1..].iter().zip(add_ops) {
                    let pos = term.pos();
                    let rhs = self.eval_expr(term)?;
                    let acc_value = acc.borrow().clone();
                    let rhs_value = rhs.borrow().clone();
                    ops::check_binary_types(&acc_value, &rhs_value, false).map_err(|k| EvalError::at(k, pos))?;
                    let result = ops::combine_additive(&acc_value, &rhs_value, *op).map_err(|k| EvalError::at(k, pos))?;
                    acc = new_slot(result);
                }
                Ok(acc)
            }
            Expr::Multiplicative { terms, ops: mul_ops } => {
                let mut acc = self.eval_expr(&terms[0])?;
                for (term, op) in terms[1..].iter().zip(mul_ops) {
                    let pos = term.pos();
                    let rhs = self.eval_expr(term)?;
                    let acc_value = acc.borrow().clone();
                    let rhs_value = rhs.borrow().clone();
                    ops::check_binary_types(&acc_value, &rhs_value, false).map_err(|k| EvalError::at(k, pos))?;
                    let result =
                        ops::combine_multiplicative(&acc_value, &rhs_value, *op).map_err(|k| EvalError::at(k, pos))?;
                    acc = new_slot(result);
                }
                Ok(acc)
            }
            Expr::Negated { inner, pos } => {
                let slot = self.eval_expr(inner)?;
                let value = slot.borrow().clone();
                let result = ops::negate(&value).map_err(|k| EvalError::at(k, *pos))?;
                Ok(new_slot(result))
            }
            Expr::Call(call) => self.eval_call(call),
            Expr::IdentifierRef(iref) => self.eval_identifier_ref(iref),
            Expr::NumberLit(n, _) => Ok(new_slot(Value::Number(*n))),
            Expr::StringLit(s, _) => Ok(new_slot(Value::String(s.clone()))),
            Expr::MatrixLit { cells, separators, pos } => self.eval_matrix_lit(cells, separators, *pos),
            Expr::DotsSelect(_) => Ok(new_slot(Value::Dots)),
            Expr::Condition(cond) => {
                let b = self.eval_condition(cond)?;
                Ok(new_slot(Value::Number(if b { 1.0 } else { 0.0 })))
            }
        }
    }

    fn eval_identifier_ref(&mut self, iref: &IdentifierRef) -> Result<Slot, EvalError> {
        let slot = self.stack.get(&iref.name);
        match &iref.index {
            None => {
                let is_matrix = matches!(&*slot.borrow(), Value::Matrix(_));
                if is_matrix {
                    Ok(Rc::clone(&slot))
                } else {
                    Ok(new_slot(slot.borrow().clone()))
                }
            }
            Some(index) => {
                let matrix_rc = match &*slot.borrow() {
                    Value::Matrix(m) => Rc::clone(m),
                    _ => return Err(EvalError::at(EvalErrorKind::InvalidType, iref.pos)),
                };
                let first = self.eval_selector(&index.first)?;
                let second = self.eval_selector(&index.second)?;
                match (first, second) {
                    (Selector::Dots, Selector::Dots) => Ok(Rc::clone(&slot)),
                    (Selector::Index(i), Selector::Dots) => {
                        let row = matrix_rc.borrow().row(i).map_err(|k| EvalError::at(k, iref.pos))?;
                        Ok(new_slot(Value::matrix(row)))
                    }
                    (Selector::Dots, Selector::Index(j)) => {
                        let col = matrix_rc.borrow().column(j).map_err(|k| EvalError::at(k, iref.pos))?;
                        Ok(new_slot(Value::matrix(col)))
                    }
                    (Selector::Index(i), Selector::Index(j)) => {
                        let v = matrix_rc.borrow().cell(i, j).map_err(|k| EvalError::at(k, iref.pos))?;
                        Ok(new_slot(Value::Number(v)))
                    }
                }
            }
        }
    }

    fn eval_matrix_lit(&mut self, cells: &[Expr], separators: &[MatrixSep], pos: Position) -> Result<Slot, EvalError> {
        let mut rows: Vec<Vec<f64>> = vec![Vec::new()];
        rows.last_mut().expect("at least one row").push(self.eval_scalar_cell(&cells[0])?);
        for (cell, sep) in cells[1..].iter().zip(separators) {
            let value = self.eval_scalar_cell(cell)?;
            match sep {
                MatrixSep::Comma => rows.last_mut().expect("at least one row").push(value),
                MatrixSep::Semicolon => rows.push(vec![value]),
            }
        }
        let cols = rows[0].len();
        if rows.iter().any(|r| r.len() != cols) {
            return Err(EvalError::at(EvalErrorKind::InvalidMatrixLiteral, pos));
        }
        let data: Vec<f64> = rows.into_iter().flatten().collect();
        let row_count = data.len() / cols;
        Ok(new_slot(Value::matrix(Matrix::new(row_count, cols, data))))
    }

    fn eval_scalar_cell(&mut self, cell: &Expr) -> Result<f64, EvalError> {
        let pos = cell.pos();
        let slot = self.eval_expr(cell)?;
        match &*slot.borrow() {
            Value::Number(n) => Ok(*n),
            _ => Err(EvalError::at(EvalErrorKind::InvalidType, pos)),
        }
    }

    fn eval_call(&mut self, call: &CallExpr) -> Result<Slot, EvalError> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.eval_expr(arg)?);
        }
        self.dispatch_call(&call.name, args, call.pos)
    }

    fn dispatch_call(&mut self, name: &str, args: Vec<Slot>, pos: Position) -> Result<Slot, EvalError> {
        if let Some(def) = self.program.functions.get(name) {
            return self.call_user_function(def, args, pos);
        }
        if let Some(result) = stdlib::call(name, args, pos) {
            return result.map_err(|e| e.with_frame(format!("call to `{name}`")));
        }
        Err(EvalError::at(EvalErrorKind::UndefinedFunction(name.to_string()), pos))
    }

    fn call_user_function(&mut self, def: &FunctionDef, args: Vec<Slot>, pos: Position) -> Result<Slot, EvalError> {
        if def.params.len() != args.len() {
            return Err(EvalError::at(
                EvalErrorKind::FunctionArgumentsMismatch { name: def.name.clone(), expected: def.params.len(), got: args.len() },
                pos,
            ));
        }
        let initial: Vec<(String, Slot)> = def.params.iter().cloned().zip(args).collect();
        self.stack.open_context(initial);
        match self.exec_block(&def.body) {
            Ok(flow) => {
                self.stack.close_context();
                Ok(flow.unwrap_or_else(|| new_slot(Value::Undefined)))
            }
            Err(e) => Err(e.with_frame(format!("function `{}`", def.name))),
        }
    }
}
