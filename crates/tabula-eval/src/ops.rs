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

//! Binary operator semantics shared by additive/multiplicative
//! expressions and relational conditions (spec §4.4.3, §4.4.4, §4.4.6).

use tabula_ast::{AddOp, CmpOp, MulOp};
use tabula_errors::EvalErrorKind;

use crate::matrix::Matrix;
use crate::value::Value;

fn tag(v: &Value) -> &'static str {
    v.type_name()
}

/// §4.4.6 type-matching policy. `for_assignment` selects the stricter
/// rule used by plain (non-indexed) assignment, where MATRIX⊕NUMBER is
/// not allowed even though it is for expressions.
pub fn check_binary_types(left: &Value, right: &Value, for_assignment: bool) -> Result<(), EvalErrorKind> {
    if for_assignment && matches!(left, Value::Undefined) && !matches!(right, Value::Undefined) {
        return Ok(());
    }
    if matches!(left, Value::Undefined) || matches!(right, Value::Undefined) {
        return Err(EvalErrorKind::UndefinedVariable);
    }
    if tag(left) == tag(right) {
        return Ok(());
    }
    if !for_assignment && matches!(left, Value::Matrix(_)) && matches!(right, Value::Number(_)) {
        return Ok(());
    }
    Err(EvalErrorKind::TypesMismatch)
}

/// Assumes [`check_binary_types`] already passed with `for_assignment = false`.
pub fn combine_additive(left: &Value, right: &Value, op: AddOp) -> Result<Value, EvalErrorKind> {
    match (left, right, op) {
        (Value::Matrix(a), Value::Matrix(b), AddOp::Add) => {
            Ok(Value::matrix(a.borrow().zip_with(&b.borrow(), |x, y| x + y)?))
        }
        (Value::Matrix(a), Value::Matrix(b), AddOp::Sub) => {
            Ok(Value::matrix(a.borrow().zip_with(&b.borrow(), |x, y| x - y)?))
        }
        (Value::Matrix(a), Value::Number(n), AddOp::Add) => Ok(Value::matrix(a.borrow().map(|x| x + n))),
        (Value::Matrix(a), Value::Number(n), AddOp::Sub) => Ok(Value::matrix(a.borrow().map(|x| x - n))),
        (Value::Number(a), Value::Number(b), AddOp::Add) => Ok(Value::Number(a + b)),
        (Value::Number(a), Value::Number(b), AddOp::Sub) => Ok(Value::Number(a - b)),
        _ => Err(EvalErrorKind::InvalidType),
    }
}

/// Assumes [`check_binary_types`] already passed with `for_assignment = false`.
pub fn combine_multiplicative(left: &Value, right: &Value, op: MulOp) -> Result<Value, EvalErrorKind> {
    match (left, right, op) {
        (Value::Matrix(a), Value::Matrix(b), MulOp::Mul) => Ok(Value::matrix(a.borrow().matmul(&b.borrow())?)),
        (Value::Matrix(_), Value::Matrix(_), MulOp::Div) => Err(EvalErrorKind::TypesMismatch),
        (Value::Matrix(a), Value::Number(n), MulOp::Mul) => Ok(Value::matrix(a.borrow().map(|x| x * n))),
        (Value::Matrix(a), Value::Number(n), MulOp::Div) => {
            if *n == 0.0 {
                Err(EvalErrorKind::ZeroDivision)
            } else {
                Ok(Value::matrix(a.borrow().map(|x| x / n)))
            }
        }
        (Value::Number(a), Value::Number(b), MulOp::Mul) => Ok(Value::Number(a * b)),
        (Value::Number(a), Value::Number(b), MulOp::Div) => {
            if *b == 0.0 {
                Err(EvalErrorKind::ZeroDivision)
            } else {
                Ok(Value::Number(a / b))
            }
        }
        _ => Err(EvalErrorKind::InvalidType),
    }
}

pub fn negate(value: &Value) -> Result<Value, EvalErrorKind> {
    match value {
        Value::Number(n) => Ok(Value::Number(-n)),
        Value::Matrix(m) => Ok(Value::matrix(m.borrow().map(|x| -x))),
        _ => Err(EvalErrorKind::InvalidType),
    }
}

/// §4.4.4 truthiness coercion.
pub fn truthy(value: &Value) -> Result<bool, EvalErrorKind> {
    match value {
        Value::Number(n) => Ok(*n != 0.0),
        Value::String(s) => Ok(!s.is_empty()),
        Value::Matrix(m) => Ok(m.borrow().any_nonzero()),
        Value::Dots | Value::Undefined => Err(EvalErrorKind::InvalidType),
    }
}

/// §4.4.4 comparison rules.
pub fn compare(left: &Value, right: &Value, op: CmpOp) -> Result<bool, EvalErrorKind> {
    if matches!(left, Value::String(_) | Value::Undefined) || matches!(right, Value::String(_) | Value::Undefined) {
        return Err(EvalErrorKind::InvalidType);
    }
    match (left, right) {
        (Value::Matrix(a), Value::Matrix(b)) => compare_matrices(&a.borrow(), &b.borrow(), op),
        (Value::Number(a), Value::Number(b)) => Ok(compare_numbers(*a, *b, op)),
        _ => Err(EvalErrorKind::TypesMismatch),
    }
}

fn compare_numbers(a: f64, b: f64, op: CmpOp) -> bool {
    match op {
        CmpOp::Lt => a < b,
        CmpOp::Le => a <= b,
        CmpOp::Gt => a > b,
        CmpOp::Ge => a >= b,
        CmpOp::Eq => a == b,
        CmpOp::Ne => a != b,
    }
}

fn compare_matrices(a: &Matrix, b: &Matrix, op: CmpOp) -> Result<bool, EvalErrorKind> {
    match op {
        CmpOp::Eq => Ok(a == b),
        CmpOp::Ne => Ok(a != b),
        _ => {
            if a.shape() != b.shape() {
                return Err(EvalErrorKind::MatrixDimensionsMismatch);
            }
            Ok(a.as_slice().iter().zip(b.as_slice()).all(|(&x, &y)| compare_numbers(x, y, op)))
        }
    }
}
