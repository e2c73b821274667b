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

//! End-to-end tests running whole source programs through the full
//! scanner → parser → evaluator pipeline (spec §8).
//!
//! `tests/programs/*.tab` holds golden-file fixtures: each source file is
//! paired with a `.out` file holding its expected `Display`-rendered
//! result, walked the way the teacher's `interpreter2/src/test_interpreter.rs`
//! walks its own fixture directory. The concrete scenarios from spec §8
//! (S1-S6, E1-E5) are additionally asserted as literal inline sources
//! below, so the exact text from the spec is what gets exercised.

use std::path::Path;

use walkdir::WalkDir;

use tabula_errors::{Error, EvalErrorKind, LexError, ParseError};
use tabula_eval::Value;

fn run(source: &str) -> Result<Value, Error> {
    let program = tabula_parser::parse(source)?;
    Ok(tabula_eval::run_program(&program)?)
}

#[test]
fn golden_fixture_programs_match_expected_output() {
    let programs_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/programs");
    let mut checked = 0;
    for entry in WalkDir::new(&programs_dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("tab") {
            continue;
        }
        let source = std::fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()));
        let expected_path = path.with_extension("out");
        let expected = std::fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("reading {}: {e}", expected_path.display()));
        let value = run(&source).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        assert_eq!(value.to_string(), expected.trim_end(), "{}", path.display());
        checked += 1;
    }
    assert!(checked >= 8, "expected at least 8 golden fixtures, found {checked}");
}

// ---- Spec §8 scenarios, quoted verbatim ----

#[test]
fn s1_function_call_and_addition() {
    let v = run("sum(a,b){return a+b} main(){return sum(3,4)}").unwrap();
    assert_eq!(v, Value::Number(7.0));
}

#[test]
fn s2_if_else_with_string_and_numeric_branches() {
    let v = run(r#"main(){a=3 b=10 if(a+b>17){return "Totally wrong!"} else{return a+b+b}}"#).unwrap();
    assert_eq!(v, Value::Number(23.0));
}

#[test]
fn s3_matrix_aliasing_through_argument_passing() {
    let source = r#"
        modify(a){ b=[0,0] a[0,:]=b a = a+5 }
        main(){ a=[1,2;3,4] modify(a) return a-2 }
    "#;
    let v = run(source).unwrap();
    match v {
        Value::Matrix(m) => assert_eq!(m.borrow().as_slice(), &[3.0, 3.0, 6.0, 7.0]),
        other => panic!("expected a matrix, got {other:?}"),
    }
}

#[test]
fn s4_number_argument_passed_by_copy() {
    let v = run("modify(a){a=a+5} main(){a=12 modify(a) return a-2}").unwrap();
    assert_eq!(v, Value::Number(10.0));
}

#[test]
fn s5_recursion() {
    let v = run("recursion(a){if(a){return 3+recursion(a-1)} return 0} main(){return recursion(10)}").unwrap();
    assert_eq!(v, Value::Number(30.0));
}

#[test]
fn s6_until_loop() {
    let v = run("main(){a=10 b=0 until(a){b=b+a a=a-1} return b}").unwrap();
    assert_eq!(v, Value::Number(55.0));
}

#[test]
fn e1_missing_main_is_an_error() {
    let err = run("helper(){return 1}").unwrap_err();
    assert!(matches!(err, Error::Eval(e) if e.kind == EvalErrorKind::MissingMain));
}

#[test]
fn e2_division_by_zero() {
    let err = run("main(){return 1/0}").unwrap_err();
    assert!(matches!(err, Error::Eval(e) if e.kind == EvalErrorKind::ZeroDivision));
}

#[test]
fn e3_matrix_dimensions_mismatch() {
    let err = run("main(){return [1,2;3,4]*[1,2]}").unwrap_err();
    assert!(matches!(err, Error::Eval(e) if e.kind == EvalErrorKind::MatrixDimensionsMismatch));
}

#[test]
fn e4_unterminated_string_reports_opening_quote_position() {
    let err = match tabula_parser::parse("main(){return \"abc}") {
        Err(Error::Lex(e)) => e,
        other => panic!("expected a lex error, got {other:?}"),
    };
    assert!(matches!(err, LexError::InvalidString { .. }));
    assert_eq!(err.position().col, 15);
}

#[test]
fn e5_identifier_longer_than_the_configured_maximum() {
    let long_name = "a".repeat(300);
    let source = format!("main(){{ {long_name} = 1 return {long_name} }}");
    let err = match tabula_parser::parse(&source) {
        Err(Error::Lex(e)) => e,
        other => panic!("expected a lex error, got {other:?}"),
    };
    assert!(matches!(err, LexError::LargeIdentifier { .. }));
}

#[test]
fn duplicate_function_names_fail_parsing() {
    let err = match tabula_parser::parse("f(){return 1} f(){return 2}") {
        Err(Error::Parse(e)) => e,
        other => panic!("expected a parse error, got {other:?}"),
    };
    assert!(matches!(err, ParseError::FunctionDuplication { name, .. } if name == "f"));
}
