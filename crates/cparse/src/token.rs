//! The token stream the parser consumes.
//!
//! Tokens themselves are produced by an external lexer/preprocessor
//! (§1, §6 of the design notes); this module only describes their
//! shape and the read-only cursor the grammar driver walks over them
//! with.

use crate::span::Span;

/// One lexeme kind. Punctuators and keywords are flattened into a
/// single enum, as the grammar driver dispatches on exact token
/// identity rather than on a coarser "is a punctuator" predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Auto,
    Break,
    Case,
    Char,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extern,
    Float,
    For,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Register,
    Restrict,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    Struct,
    Switch,
    Typedef,
    Union,
    Unsigned,
    Void,
    Volatile,
    While,
    Bool,

    // Identifiers and literals
    Identifier,
    NumericConstant,
    CharConstant,
    StringLiteral,

    // Punctuators
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Dot,
    Arrow,
    PlusPlus,
    MinusMinus,
    Amp,
    Star,
    Plus,
    Minus,
    Tilde,
    Bang,
    Slash,
    Percent,
    LtLt,
    GtGt,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    BangEq,
    Caret,
    Pipe,
    AmpAmp,
    PipePipe,
    Question,
    Colon,
    Semi,
    Ellipsis,
    Eq,
    StarEq,
    SlashEq,
    PercentEq,
    PlusEq,
    MinusEq,
    LtLtEq,
    GtGtEq,
    AmpEq,
    CaretEq,
    PipeEq,
    Comma,

    /// Synthetic sentinel returned by the token view past the end of
    /// the stream.
    Eof,
}

impl TokenKind {
    /// The assignment-operator set used by the `AssignExpr` loop
    /// (§4.8's canonical table, not the per-revision set the original
    /// implementation drifted on — see `DESIGN.md`).
    pub fn is_assignment_operator(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Eq | StarEq
                | SlashEq
                | PercentEq
                | PlusEq
                | MinusEq
                | LtLtEq
                | GtGtEq
                | AmpEq
                | CaretEq
                | PipeEq
        )
    }
}

/// Decoded payload carried by literal tokens (§3). The lexer has
/// already done base/suffix/escape interpretation; the parser only
/// ever inspects the *shape* of this value, never reinterprets bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    None,
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    Float(f32),
    Double(f64),
    Str(String),
}

/// A single lexeme as produced by the external lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub file_id: u32,
    /// Nonzero if this token came out of macro expansion. The parser
    /// never inspects this field; it is carried through purely so
    /// diagnostics built downstream can blame the right expansion.
    pub macro_id: u32,
    pub leading_whitespace: bool,
    /// The token's source text, owned. For `identifier` this is the
    /// name; for everything else it is mostly diagnostic-only.
    pub text: String,
    pub value: LiteralValue,
}

impl Token {
    pub fn synthetic_eof(at: Span) -> Token {
        Token {
            kind: TokenKind::Eof,
            span: at,
            file_id: 0,
            macro_id: 0,
            leading_whitespace: false,
            text: String::new(),
            value: LiteralValue::None,
        }
    }
}

/// Either a borrowed token from the underlying slice, or an owned
/// synthetic EOF token. Lets [`TokenView::peek`] stay allocation-free
/// on the hot path while still handing callers a uniform type past
/// the end of input.
#[derive(Debug, Clone)]
pub enum TokenRef<'a> {
    Borrowed(&'a Token),
    Synthetic(Token),
}

impl<'a> TokenRef<'a> {
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenRef::Borrowed(t) => t.kind,
            TokenRef::Synthetic(t) => t.kind,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TokenRef::Borrowed(t) => t.span,
            TokenRef::Synthetic(t) => t.span,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            TokenRef::Borrowed(t) => &t.text,
            TokenRef::Synthetic(t) => &t.text,
        }
    }

    pub fn value(&self) -> &LiteralValue {
        match self {
            TokenRef::Borrowed(t) => &t.value,
            TokenRef::Synthetic(t) => &t.value,
        }
    }
}

/// An immutable, random-access cursor over a token slice.
///
/// Only the cursor position is mutable; the underlying token slice
/// never is (§5: "The token view is immutable; only the cursor ...
/// mutates"). Peeking past the end of the stream yields a synthetic
/// EOF token at the last known location, so callers can report
/// "unexpected end of file" without special-casing bounds everywhere.
pub struct TokenView<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenView<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        TokenView { tokens, pos: 0 }
    }

    fn eof_span(&self) -> Span {
        self.tokens.last().map(|t| t.span).unwrap_or_default()
    }

    /// Current cursor position, for saving/restoring bounded
    /// backtrack points (§5).
    pub fn mark(&self) -> usize {
        self.pos
    }

    pub fn reset(&mut self, mark: usize) {
        self.pos = mark;
    }

    /// Looks `n` tokens ahead of the cursor without consuming
    /// anything. `peek(0)` is the current token.
    pub fn peek(&self, n: usize) -> TokenRef<'a> {
        match self.tokens.get(self.pos + n) {
            Some(tok) => TokenRef::Borrowed(tok),
            None => TokenRef::Synthetic(Token::synthetic_eof(self.eof_span())),
        }
    }

    pub fn current(&self) -> TokenRef<'a> {
        self.peek(0)
    }

    pub fn kind(&self) -> TokenKind {
        self.peek(0).kind()
    }

    pub fn kind_at(&self, n: usize) -> TokenKind {
        self.peek(n).kind()
    }

    pub fn span(&self) -> Span {
        self.current().span()
    }

    /// Unconditionally moves the cursor forward one token (saturating
    /// at the end of the stream).
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Advances and returns true if `kind` matches the current token,
    /// otherwise leaves the cursor untouched.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if self.kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.kind() == TokenKind::Eof
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(kind: TokenKind) -> Token {
        Token {
            kind,
            span: Span::none(),
            file_id: 0,
            macro_id: 0,
            leading_whitespace: false,
            text: String::new(),
            value: LiteralValue::None,
        }
    }

    #[test]
    fn peek_past_end_is_synthetic_eof() {
        let tokens = vec![tok(TokenKind::Int)];
        let view = TokenView::new(&tokens);
        assert_eq!(view.kind_at(0), TokenKind::Int);
        assert_eq!(view.kind_at(1), TokenKind::Eof);
        assert_eq!(view.kind_at(100), TokenKind::Eof);
    }

    #[test]
    fn mark_and_reset_roundtrip() {
        let tokens = vec![tok(TokenKind::Int), tok(TokenKind::Identifier)];
        let mut view = TokenView::new(&tokens);
        let mark = view.mark();
        view.advance();
        view.advance();
        assert!(view.is_at_end());
        view.reset(mark);
        assert_eq!(view.kind(), TokenKind::Int);
    }

    #[test]
    fn eat_only_advances_on_match() {
        let tokens = vec![tok(TokenKind::Int)];
        let mut view = TokenView::new(&tokens);
        assert!(!view.eat(TokenKind::Char));
        assert_eq!(view.kind(), TokenKind::Int);
        assert!(view.eat(TokenKind::Int));
        assert!(view.is_at_end());
    }

    #[test]
    fn assignment_operator_set_is_canonical() {
        assert!(TokenKind::Eq.is_assignment_operator());
        assert!(TokenKind::PlusEq.is_assignment_operator());
        assert!(!TokenKind::Plus.is_assignment_operator());
    }
}
