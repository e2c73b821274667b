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

//! The standard library (spec §4.5): `print`, `cin`, `transpose`, `ident`,
//! `size`, `full`, `reshape`. Each validates its own arity and argument
//! types and fails with a stack-trace frame naming the built-in.

use std::io::Write;
use std::rc::Rc;

use tabula_errors::{EvalError, EvalErrorKind};
use tabula_span::Position;

use crate::matrix::Matrix;
use crate::value::{new_slot, Slot, Value};

/// Returns `None` when `name` isn't a recognised built-in, so the caller
/// can fall through to `UndefinedFunction`.
pub fn call(name: &str, args: Vec<Slot>, pos: Position) -> Option<Result<Slot, EvalError>> {
    let result = match name {
        "print" => print(&args),
        "cin" => cin(&args, pos),
        "transpose" => transpose(&args, pos),
        "ident" => ident(&args, pos),
        "size" => size(&args, pos),
        "full" => full(&args, pos),
        "reshape" => reshape(&args, pos),
        _ => return None,
    };
    Some(result)
}

fn expect_arity(name: &str, args: &[Slot], expected: usize, pos: Position) -> Result<(), EvalError> {
    if args.len() != expected {
        Err(EvalError::at(
            EvalErrorKind::FunctionArgumentsMismatch { name: name.to_string(), expected, got: args.len() },
            pos,
        ))
    } else {
        Ok(())
    }
}

fn expect_number(slot: &Slot, pos: Position) -> Result<f64, EvalError> {
    match &*slot.borrow() {
        Value::Number(n) => Ok(*n),
        _ => Err(EvalError::at(EvalErrorKind::InvalidType, pos)),
    }
}

fn expect_non_negative_integer(slot: &Slot, pos: Position) -> Result<usize, EvalError> {
    let n = expect_number(slot, pos)?;
    if n.fract() != 0.0 || n < 0.0 {
        return Err(EvalError::at(EvalErrorKind::InvalidType, pos));
    }
    Ok(n as usize)
}

fn expect_matrix_rc(slot: &Slot, pos: Position) -> Result<Rc<std::cell::RefCell<Matrix>>, EvalError> {
    match &*slot.borrow() {
        Value::Matrix(m) => Ok(Rc::clone(m)),
        _ => Err(EvalError::at(EvalErrorKind::InvalidType, pos)),
    }
}

/// `print(a, b, ...)`: space-joined, trailing newline. Always returns
/// `UNDEFINED`.
fn print(args: &[Slot]) -> Result<Slot, EvalError> {
    let rendered: Vec<String> = args.iter().map(|s| s.borrow().to_string()).collect();
    let mut stdout = std::io::stdout();
    let _ = writeln!(stdout, "{}", rendered.join(" "));
    Ok(new_slot(Value::Undefined))
}

/// `cin()`: reads one line from stdin, parses it as a finite NUMBER.
fn cin(args: &[Slot], pos: Position) -> Result<Slot, EvalError> {
    expect_arity("cin", args, 0, pos)?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).map_err(|_| EvalError::at(EvalErrorKind::InvalidType, pos))?;
    let n: f64 = line.trim().parse().map_err(|_| EvalError::at(EvalErrorKind::InvalidType, pos))?;
    if !n.is_finite() {
        return Err(EvalError::at(EvalErrorKind::InvalidType, pos));
    }
    Ok(new_slot(Value::Number(n)))
}

/// `transpose(m)`: transposes `m`'s storage in place, so every other
/// alias of the same matrix observes the new shape too.
fn transpose(args: &[Slot], pos: Position) -> Result<Slot, EvalError> {
    expect_arity("transpose", args, 1, pos)?;
    let m = expect_matrix_rc(&args[0], pos)?;
    m.borrow_mut().transpose_in_place();
    Ok(new_slot(Value::Matrix(m)))
}

/// `ident(n)`: the `n`×`n` identity matrix.
fn ident(args: &[Slot], pos: Position) -> Result<Slot, EvalError> {
    expect_arity("ident", args, 1, pos)?;
    let n = expect_non_negative_integer(&args[0], pos)?;
    Ok(new_slot(Value::matrix(Matrix::identity(n))))
}

/// `size(m)`: a `1×2` matrix `[rows, cols]`.
fn size(args: &[Slot], pos: Position) -> Result<Slot, EvalError> {
    expect_arity("size", args, 1, pos)?;
    let m = expect_matrix_rc(&args[0], pos)?;
    let (rows, cols) = m.borrow().shape();
    Ok(new_slot(Value::matrix(Matrix::new(1, 2, vec![rows as f64, cols as f64]))))
}

/// `full(rows, cols, value)`: a `rows`×`cols` matrix filled with `value`.
fn full(args: &[Slot], pos: Position) -> Result<Slot, EvalError> {
    expect_arity("full", args, 3, pos)?;
    let rows = expect_non_negative_integer(&args[0], pos)?;
    let cols = expect_non_negative_integer(&args[1], pos)?;
    let value = expect_number(&args[2], pos)?;
    Ok(new_slot(Value::matrix(Matrix::filled(rows, cols, value))))
}

/// `reshape(m, rows, cols)`: reinterprets `m`'s row-major storage with a
/// new shape, requiring the element count to match exactly.
fn reshape(args: &[Slot], pos: Position) -> Result<Slot, EvalError> {
    expect_arity("reshape", args, 3, pos)?;
    let m = expect_matrix_rc(&args[0], pos)?;
    let rows = expect_non_negative_integer(&args[1], pos)?;
    let cols = expect_non_negative_integer(&args[2], pos)?;
    let data = m.borrow().as_slice().to_vec();
    if rows * cols != data.len() {
        return Err(EvalError::at(EvalErrorKind::MatrixDimensionsMismatch, pos));
    }
    Ok(new_slot(Value::matrix(Matrix::new(rows, cols, data))))
}
