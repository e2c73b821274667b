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

//! The `tabula` command-line interpreter (spec §6).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as ClapParser;
use tabula_errors::Error;
use tabula_lexer::{FileSource, RawSource, Scanner};

/// A tree-walking interpreter for the tabula matrix language.
#[derive(ClapParser, Debug)]
#[command(name = "tabula", version, about)]
struct Cli {
    /// Path to a tabula source file.
    path: PathBuf,

    /// Raise logging verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log every token the scanner produces before parsing (debug only).
    #[arg(long, hide = true)]
    dump_tokens: bool,

    /// Log the parsed AST before evaluating it (debug only).
    #[arg(long, hide = true)]
    dump_ast: bool,
}

fn install_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).without_time().init();
}

fn run(cli: &Cli) -> Result<tabula_eval::Value, Error> {
    let source = FileSource::open(&cli.path).map_err(|e| {
        let kind = tabula_errors::EvalErrorKind::InvalidType;
        Error::Eval(
            tabula_errors::EvalError::new(kind)
                .with_frame(format!("reading {}: {e}", cli.path.display())),
        )
    })?;

    if cli.dump_tokens {
        dump_tokens(&cli.path);
    }

    let program = tabula_parser::parse_source(source)?;

    if cli.dump_ast {
        tracing::debug!(ast = ?program, "parsed program");
    }

    let value = tabula_eval::run_program(&program)?;
    Ok(value)
}

fn dump_tokens(path: &PathBuf) {
    let Ok(source) = FileSource::open(path) else { return };
    let mut scanner = Scanner::new(source);
    loop {
        match scanner.next_token() {
            Ok(tok) => {
                let eot = tok.is_eot();
                tracing::debug!(token = %tok, "scanned");
                if eot {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "lex error while dumping tokens");
                break;
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    match run(&cli) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
