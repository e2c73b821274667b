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

//! Runtime values and the shared-mutable slot they live in behind a
//! scope binding (spec §9 "Mutable shared scope slots").
//!
//! Two independent levels of aliasing are at play:
//!
//! - [`Slot`] gives a scope binding its own identity: `set`-ing an
//!   existing binding mutates its slot in place so every alias of that
//!   *binding* observes the new value, while a fresh binding gets its
//!   own slot.
//! - [`Value::Matrix`] wraps its data in a second, independent
//!   `Rc<RefCell<Matrix>>` so that copying a `Value` (as happens when a
//!   fresh binding is created) is cheap and mirrors the source
//!   language's "variables hold a reference to matrix storage" model —
//!   two different slots can still share the same underlying matrix.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::matrix::Matrix;

/// A scope binding. Its identity (not its contents) is what "the same
/// variable" means across nested scopes and function arguments.
pub type Slot = Rc<RefCell<Value>>;

pub fn new_slot(value: Value) -> Slot {
    Rc::new(RefCell::new(value))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Matrix(Rc<RefCell<Matrix>>),
    /// The `:` full-axis selector, only ever produced inside an index
    /// operator and never a legal operand elsewhere.
    Dots,
    /// A binding nothing has ever been assigned to (spec §4.4.2 `get`).
    Undefined,
}

impl Value {
    pub fn matrix(m: Matrix) -> Self {
        Value::Matrix(Rc::new(RefCell::new(m)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "NUMBER",
            Value::String(_) => "STRING",
            Value::Matrix(_) => "MATRIX",
            Value::Dots => "DOTS",
            Value::Undefined => "UNDEFINED",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&Rc<RefCell<Matrix>>> {
        match self {
            Value::Matrix(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Matrix(m) => {
                let m = m.borrow();
                write!(f, "[")?;
                for r in 0..m.rows {
                    if r > 0 {
                        write!(f, "; ")?;
                    }
                    for c in 0..m.cols {
                        if c > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", m.get(r, c))?;
                    }
                }
                write!(f, "]")
            }
            Value::Dots => write!(f, ":"),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}
