//! Thin driver: read a file, lex it, hand the tokens to `cparse`, and
//! print either the resulting translation unit's shape or the
//! diagnostics that kept it from parsing cleanly.

mod lexer;

use std::env;
use std::fs;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: cparse-cli <file.c>");
            return ExitCode::FAILURE;
        }
    };

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("cparse-cli: couldn't read {}: {}", path, err);
            return ExitCode::FAILURE;
        }
    };

    let tokens = lexer::lex(&source);
    log::debug!("{}: lexed {} tokens", path, tokens.len());

    let (unit, diagnostics) = cparse::parse(&source, &tokens, ["__builtin_va_list"]);

    if !diagnostics.is_empty() {
        for d in &diagnostics {
            eprintln!("{}:{}:{}: {}", path, d.line, d.column, d.message);
        }
        return ExitCode::FAILURE;
    }

    println!("{}: {} external declaration(s)", path, unit.0.len());
    ExitCode::SUCCESS
}
