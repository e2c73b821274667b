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

//! The tree-walking evaluator for the tabula language (spec §4.4, §4.5).

mod eval;
mod matrix;
mod ops;
mod scope;
mod stdlib;
mod value;

pub use eval::run_program;
pub use matrix::{Matrix, Selector};
pub use value::{new_slot, Slot, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_ast::Program;

    fn run(source: &str) -> Result<Value, tabula_errors::EvalError> {
        let program: Program = tabula_parser::parse(source).expect("source parses");
        run_program(&program)
    }

    #[test]
    fn arithmetic_and_return() {
        let v = run("main() { return 1 + 2 * 3 }").unwrap();
        assert_eq!(v, Value::Number(7.0));
    }

    #[test]
    fn matrix_argument_index_mutation_and_rebind_both_propagate() {
        let source = r#"
            modify(a) {
                b = [0, 0]
                a[0,:] = b
                a = a + 5
            }
            main() {
                a = [1, 2; 3, 4]
                modify(a)
                return a - 2
            }
        "#;
        let v = run(source).unwrap();
        match v {
            Value::Matrix(m) => assert_eq!(m.borrow().as_slice(), &[3.0, 3.0, 6.0, 7.0]),
            other => panic!("expected a matrix, got {other:?}"),
        }
    }

    #[test]
    fn number_argument_is_passed_by_copy() {
        let source = r#"
            modify(n) { n = n + 1 }
            main() {
                n = 5
                modify(n)
                return n
            }
        "#;
        let v = run(source).unwrap();
        assert_eq!(v, Value::Number(5.0));
    }

    #[test]
    fn until_loop_counts_up() {
        let source = r#"
            main() {
                i = 0
                until (i == 3) { i = i + 1 }
                return i
            }
        "#;
        assert_eq!(run(source).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn missing_main_is_an_error() {
        let program = Program { functions: indexmap::IndexMap::new() };
        assert!(run_program(&program).is_err());
    }

    #[test]
    fn calling_an_undefined_function_reports_stack_frame() {
        let source = "main() { return unknown_function() }";
        let err = run(source).unwrap_err();
        assert!(!err.frames.is_empty());
    }

    #[test]
    fn matrix_plus_number_but_not_number_plus_matrix() {
        assert_eq!(run("main() { return [1,2;3,4] + 1 }").unwrap(), run("main() { return [2,3;4,5] }").unwrap());
        assert!(run("main() { return 1 + [1,2;3,4] }").is_err());
    }
}
