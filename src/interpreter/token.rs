use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Illegal,
    Eof,
    Ident,
    Int,
    LBrace,
    RBrace,
    Colon,
    LParen,
    RParen,
    Comma,
    Else,
}

/// A classified substring of one parameter expression. `start` and `end` are
/// byte offsets into the expression, used for error reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            start,
            end,
        }
    }
}

/// Maps an identifier literal to its keyword kind, if any.
pub fn lookup_ident(literal: &str) -> TokenKind {
    match literal {
        "else" => TokenKind::Else,
        _ => TokenKind::Ident,
    }
}
