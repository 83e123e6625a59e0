//! Error handling for the conditional command parser

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frontend::semantic::SemanticType;
use crate::frontend::token::TokenKind;
use crate::utils::Position;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lexical,
    Syntax,
    Semantic,
}

/// Analysis error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexical Errors ====================

    #[error("Invalid character '{ch}' at {pos}")]
    InvalidCharacter { ch: char, pos: Position },

    #[error("Unterminated string literal at {pos}")]
    UnterminatedString { pos: Position },

    #[error("Unterminated or invalid char literal at {pos}")]
    UnterminatedChar { pos: Position },

    #[error("Unterminated block comment starting at {pos}")]
    UnterminatedComment { pos: Position },

    // ==================== Syntax Errors ====================

    #[error(
        "Syntax error [line {}, column {}]: expected '{}' but found '{}'",
        .pos.line, .pos.column, .expected, .found
    )]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        pos: Position,
    },

    #[error(
        "Syntax error [line {}, column {}]: expected '(', id, number, string, char or float but found '{}'",
        .pos.line, .pos.column, .found
    )]
    ExpectedOperand { found: TokenKind, pos: Position },

    #[error(
        "Syntax error [line {}, column {}]: nesting deeper than {} levels",
        .pos.line, .pos.column, .limit
    )]
    NestingTooDeep { limit: usize, pos: Position },

    // ==================== Semantic Errors ====================

    #[error(
        "Semantic error [line {}, column {}]: undeclared identifier '{}'",
        .pos.line, .pos.column, .name
    )]
    UndeclaredIdentifier { name: String, pos: Position },

    #[error(
        "Semantic error [line {}, column {}]: undeclared variable '{}'",
        .pos.line, .pos.column, .name
    )]
    UndeclaredVariable { name: String, pos: Position },

    #[error(
        "Semantic error [line {}, column {}]: type mismatch on '{}' - expected {} but got {}",
        .pos.line, .pos.column, .name, .expected, .got
    )]
    TypeMismatch {
        name: String,
        expected: SemanticType,
        got: SemanticType,
        pos: Position,
    },

    #[error(
        "Semantic error [line {}, column {}]: incompatible types {} and {} for operator '{}'",
        .pos.line, .pos.column, .left, .right, .op
    )]
    IncompatibleTypes {
        left: SemanticType,
        right: SemanticType,
        op: String,
        pos: Position,
    },

    #[error(
        "Semantic error [line {}, column {}]: non-numeric if condition of type {}",
        .pos.line, .pos.column, .ty
    )]
    NonNumericCondition { ty: SemanticType, pos: Position },
}

impl Error {
    /// Get the position associated with this error
    pub fn position(&self) -> Position {
        match self {
            Self::InvalidCharacter { pos, .. } => *pos,
            Self::UnterminatedString { pos } => *pos,
            Self::UnterminatedChar { pos } => *pos,
            Self::UnterminatedComment { pos } => *pos,
            Self::UnexpectedToken { pos, .. } => *pos,
            Self::ExpectedOperand { pos, .. } => *pos,
            Self::NestingTooDeep { pos, .. } => *pos,
            Self::UndeclaredIdentifier { pos, .. } => *pos,
            Self::UndeclaredVariable { pos, .. } => *pos,
            Self::TypeMismatch { pos, .. } => *pos,
            Self::IncompatibleTypes { pos, .. } => *pos,
            Self::NonNumericCondition { pos, .. } => *pos,
        }
    }

    /// Get the pipeline stage that raised this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidCharacter { .. }
            | Self::UnterminatedString { .. }
            | Self::UnterminatedChar { .. }
            | Self::UnterminatedComment { .. } => Stage::Lexical,
            Self::UnexpectedToken { .. }
            | Self::ExpectedOperand { .. }
            | Self::NestingTooDeep { .. } => Stage::Syntax,
            Self::UndeclaredIdentifier { .. }
            | Self::UndeclaredVariable { .. }
            | Self::TypeMismatch { .. }
            | Self::IncompatibleTypes { .. }
            | Self::NonNumericCondition { .. } => Stage::Semantic,
        }
    }
}
