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

//! The scope/call-frame stack (spec §4.4.2).
//!
//! A [`CallFrame`] is the stack of lexical [`Scope`]s belonging to one
//! function activation; `get`/`assign` only ever walk the *current*
//! frame's scopes — a call starts a brand new, empty frame, so nothing
//! from an enclosing call is visible to a callee (matching the source
//! language having no closures).

use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::{new_slot, Slot, Value};

type Scope = IndexMap<String, Slot>;

#[derive(Default)]
struct CallFrame {
    scopes: Vec<Scope>,
}

impl CallFrame {
    fn new(initial: Scope) -> Self {
        Self { scopes: vec![initial] }
    }
}

/// The interpreter's whole stack of call frames.
#[derive(Default)]
pub struct Stack {
    frames: Vec<CallFrame>,
}

impl Stack {
    pub fn new() -> Self {
        Self { frames: vec![CallFrame::new(Scope::new())] }
    }

    pub fn open_scope(&mut self) {
        self.current_frame_mut().scopes.push(Scope::new());
    }

    pub fn close_scope(&mut self) {
        self.current_frame_mut().scopes.pop();
    }

    /// Pushes a new call frame, pre-populated with parameter→argument
    /// bindings installed directly (not merged against any existing
    /// scope — the frame starts empty, so this always takes the "fresh
    /// binding" path of [`Stack::assign`]).
    pub fn open_context(&mut self, initial: Vec<(String, Slot)>) {
        let mut scope = Scope::new();
        for (name, slot) in initial {
            scope.insert(name, slot);
        }
        self.frames.push(CallFrame::new(scope));
    }

    pub fn close_context(&mut self) {
        self.frames.pop();
    }

    fn current_frame_mut(&mut self) -> &mut CallFrame {
        self.frames.last_mut().expect("stack always has at least one frame")
    }

    /// Looks up `name` top-down through the current frame's scopes. On a
    /// miss, creates an `UNDEFINED` slot in the innermost scope and
    /// returns that — reads never fail, they materialise the binding.
    pub fn get(&mut self, name: &str) -> Slot {
        let frame = self.current_frame_mut();
        for scope in frame.scopes.iter().rev() {
            if let Some(slot) = scope.get(name) {
                return Rc::clone(slot);
            }
        }
        let slot = new_slot(Value::Undefined);
        frame.scopes.last_mut().expect("a frame always has an innermost scope").insert(name.to_string(), Rc::clone(&slot));
        slot
    }

    /// Installs `rhs` as the value of `name` in the current frame. If a
    /// binding already exists, its slot's *contents* are overwritten
    /// in place (so every existing alias of that binding observes the
    /// new value) — the slot itself is never replaced. Otherwise `rhs`
    /// is inserted directly into the innermost scope, so a fresh binding
    /// shares `rhs`'s own identity (spec §4.4.2 `set`).
    pub fn assign(&mut self, name: &str, rhs: Slot) {
        let frame = self.current_frame_mut();
        for scope in frame.scopes.iter_mut().rev() {
            if let Some(existing) = scope.get(name) {
                let new_value = rhs.borrow().clone();
                *existing.borrow_mut() = new_value;
                return;
            }
        }
        frame.scopes.last_mut().expect("a frame always has an innermost scope").insert(name.to_string(), rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn get_materialises_undefined_on_miss() {
        let mut stack = Stack::new();
        let slot = stack.get("x");
        assert_eq!(*slot.borrow(), Value::Undefined);
    }

    #[test]
    fn assign_to_existing_binding_preserves_slot_identity() {
        let mut stack = Stack::new();
        let first = stack.get("x");
        stack.assign("x", new_slot(Value::Number(3.0)));
        let second = stack.get("x");
        assert!(std::rc::Rc::ptr_eq(&first, &second));
        assert_eq!(*second.borrow(), Value::Number(3.0));
    }

    #[test]
    fn assign_to_fresh_binding_shares_the_given_slot() {
        let mut stack = Stack::new();
        let produced = new_slot(Value::Number(5.0));
        stack.assign("y", std::rc::Rc::clone(&produced));
        let found = stack.get("y");
        assert!(std::rc::Rc::ptr_eq(&produced, &found));
    }

    #[test]
    fn context_boundary_hides_outer_scopes() {
        let mut stack = Stack::new();
        stack.assign("x", new_slot(Value::Number(1.0)));
        stack.open_context(Vec::new());
        assert_eq!(*stack.get("x").borrow(), Value::Undefined);
        stack.close_context();
        assert_eq!(*stack.get("x").borrow(), Value::Number(1.0));
    }
}
