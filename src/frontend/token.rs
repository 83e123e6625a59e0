//! Token definitions for the conditional command language

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::Position;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. For STRING and CHAR this is the content between the
    /// quotes with escapes left undecoded.
    pub lexeme: String,
    pub pos: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, pos: Position) -> Self {
        Self { kind, lexeme: lexeme.into(), pos }
    }

    pub fn eof(pos: Position) -> Self {
        Self { kind: TokenKind::Eof, lexeme: String::new(), pos }
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    // ============ Keywords ============
    /// if
    If,
    /// else
    Else,

    // ============ Punctuation ============
    /// (
    LParen,
    /// )
    RParen,

    // ============ Identifiers and Literals ============
    Id,
    /// Integer literal, e.g. `42`
    Number,
    /// Decimal literal, e.g. `3.14`
    Float,
    Char,
    String,

    // ============ Operators ============
    /// =
    Equals,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Times,
    /// /
    Divide,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Get keyword from string
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            _ => None,
        }
    }

    /// Map a single-character operator or punctuation mark
    pub fn from_symbol(c: char) -> Option<TokenKind> {
        match c {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            '=' => Some(TokenKind::Equals),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Times),
            '/' => Some(TokenKind::Divide),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Id => "ID",
            TokenKind::Number => "NUMBER",
            TokenKind::Float => "FLOAT",
            TokenKind::Char => "CHAR",
            TokenKind::String => "STRING",
            TokenKind::Equals => "EQUALS",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) at {}", self.kind, self.lexeme, self.pos)
    }
}
