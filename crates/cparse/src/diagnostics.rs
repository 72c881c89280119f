//! Diagnostics sink (§7).
//!
//! The parser surfaces every syntax problem as one kind, `Diagnostic`,
//! carrying a `(line, column, message)` triple; formatting, coloring
//! and severity levels beyond "error" belong to a caller, not here.

use crate::span::Span;
use thiserror::Error;

/// A single reported problem, already resolved to a line/column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn at(source: &str, span: Span, message: impl Into<String>) -> Diagnostic {
        let (line, column) = span.location_in(source);
        Diagnostic {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Internal contract violations of the token-view / parser API
/// itself — not expected syntax errors in user input (those are
/// [`Diagnostic`]s, accumulated as data, never thrown). This type only
/// exists for states that indicate a bug in the parser or an
/// unreachable-by-construction lexer output (§7, category 5).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unreachable grammar state at byte {offset}: {detail}")]
    UnreachableState { offset: usize, detail: &'static str },
}
