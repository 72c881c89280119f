//! A minimal, dependency-free lexer.
//!
//! `cparse` itself takes no position on lexing or preprocessing — it
//! consumes whatever token slice its caller hands it. This module is
//! only here so the CLI has *something* to hand it from a raw `.c`
//! file; it has no macro expansion, no trigraphs, no line splicing,
//! and gives up with a panic on anything it doesn't recognise. A real
//! frontend would plug a proper preprocessor in here instead.

use cparse::{LiteralValue, Token, TokenKind};

pub fn lex(src: &str) -> Vec<Token> {
    Lexer {
        src,
        bytes: src.as_bytes(),
        pos: 0,
    }
    .run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let leading_whitespace = self.skip_trivia();
            if self.pos >= self.bytes.len() {
                break;
            }
            let start = self.pos;
            let (kind, value) = self.scan_one();
            tokens.push(Token {
                kind,
                span: cparse::span::Span::new(start, self.pos),
                file_id: 0,
                macro_id: 0,
                leading_whitespace,
                text: self.src[start..self.pos].to_string(),
                value,
            });
        }
        tokens
    }

    fn skip_trivia(&mut self) -> bool {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while self.peek().is_some() && self.peek() != Some(b'\n') {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.pos += 2;
                    while self.pos < self.bytes.len() && !(self.peek() == Some(b'*') && self.peek_at(1) == Some(b'/')) {
                        self.pos += 1;
                    }
                    self.pos = (self.pos + 2).min(self.bytes.len());
                }
                _ => break,
            }
        }
        self.pos != start
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    fn scan_one(&mut self) -> (TokenKind, LiteralValue) {
        let b = self.peek().unwrap();
        if b.is_ascii_digit() {
            return self.scan_number();
        }
        if b == b'_' || b.is_ascii_alphabetic() {
            return self.scan_identifier_or_keyword();
        }
        if b == b'"' {
            return self.scan_string();
        }
        if b == b'\'' {
            return self.scan_char();
        }
        self.scan_punctuator()
    }

    fn scan_identifier_or_keyword(&mut self) -> (TokenKind, LiteralValue) {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b == b'_' || b.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let kind = keyword(&self.src[start..self.pos]).unwrap_or(TokenKind::Identifier);
        (kind, LiteralValue::None)
    }

    fn scan_number(&mut self) -> (TokenKind, LiteralValue) {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'.') {
            self.pos += 1;
        }
        let text = &self.src[start..self.pos];
        let value = text
            .trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L' | 'f' | 'F'))
            .parse::<i64>()
            .map(|n| LiteralValue::I32(n as i32))
            .unwrap_or(LiteralValue::None);
        (TokenKind::NumericConstant, value)
    }

    fn scan_string(&mut self) -> (TokenKind, LiteralValue) {
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'"' {
                break;
            }
            self.pos += if b == b'\\' { 2 } else { 1 };
        }
        let text = self.src[start..self.pos.min(self.bytes.len())].to_string();
        if self.peek() == Some(b'"') {
            self.pos += 1;
        }
        (TokenKind::StringLiteral, LiteralValue::Str(text))
    }

    fn scan_char(&mut self) -> (TokenKind, LiteralValue) {
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == b'\'' {
                break;
            }
            self.pos += if b == b'\\' { 2 } else { 1 };
        }
        let text = self.src[start..self.pos.min(self.bytes.len())].to_string();
        if self.peek() == Some(b'\'') {
            self.pos += 1;
        }
        (TokenKind::CharConstant, LiteralValue::Str(text))
    }

    fn scan_punctuator(&mut self) -> (TokenKind, LiteralValue) {
        use TokenKind::*;
        let rest = &self.src[self.pos..];
        for (text, kind) in THREE_CHAR_PUNCTUATORS.iter() {
            if rest.starts_with(text) {
                self.pos += 3;
                return (*kind, LiteralValue::None);
            }
        }
        for (text, kind) in TWO_CHAR_PUNCTUATORS.iter() {
            if rest.starts_with(text) {
                self.pos += 2;
                return (*kind, LiteralValue::None);
            }
        }
        let one = self.peek().unwrap();
        self.pos += 1;
        let kind = match one {
            b'[' => LBracket,
            b']' => RBracket,
            b'(' => LParen,
            b')' => RParen,
            b'{' => LBrace,
            b'}' => RBrace,
            b'.' => Dot,
            b'&' => Amp,
            b'*' => Star,
            b'+' => Plus,
            b'-' => Minus,
            b'~' => Tilde,
            b'!' => Bang,
            b'/' => Slash,
            b'%' => Percent,
            b'<' => Lt,
            b'>' => Gt,
            b'^' => Caret,
            b'|' => Pipe,
            b'?' => Question,
            b':' => Colon,
            b';' => Semi,
            b'=' => Eq,
            b',' => Comma,
            other => panic!("lexer: unsupported character {:?}", other as char),
        };
        (kind, LiteralValue::None)
    }
}

const THREE_CHAR_PUNCTUATORS: &[(&str, TokenKind)] = &[
    ("...", TokenKind::Ellipsis),
    ("<<=", TokenKind::LtLtEq),
    (">>=", TokenKind::GtGtEq),
];

const TWO_CHAR_PUNCTUATORS: &[(&str, TokenKind)] = &[
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("->", TokenKind::Arrow),
    ("<<", TokenKind::LtLt),
    (">>", TokenKind::GtGt),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("&=", TokenKind::AmpEq),
    ("^=", TokenKind::CaretEq),
    ("|=", TokenKind::PipeEq),
];

fn keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "auto" => Auto,
        "break" => Break,
        "case" => Case,
        "char" => Char,
        "const" => Const,
        "continue" => Continue,
        "default" => Default,
        "do" => Do,
        "double" => Double,
        "else" => Else,
        "enum" => Enum,
        "extern" => Extern,
        "float" => Float,
        "for" => For,
        "goto" => Goto,
        "if" => If,
        "inline" => Inline,
        "int" => Int,
        "long" => Long,
        "register" => Register,
        "restrict" => Restrict,
        "return" => Return,
        "short" => Short,
        "signed" => Signed,
        "sizeof" => Sizeof,
        "static" => Static,
        "struct" => Struct,
        "switch" => Switch,
        "typedef" => Typedef,
        "union" => Union,
        "unsigned" => Unsigned,
        "void" => Void,
        "volatile" => Volatile,
        "while" => While,
        "_Bool" => Bool,
        _ => return None,
    })
}
