//! Error types for loading definitions and resolving types.
//!
//! Structural mismatches are NOT errors: `Normalizer::normalize` reports
//! them as `Outcome::Mismatch`. Everything here is either a malformed
//! definition source or a caller/configuration mistake.
use std::fmt;
use thiserror::Error;

use crate::normalize::Mismatch;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 1-based position in definition source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Resolve a byte offset into a line/column pair.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("{at}: unexpected character `{ch}`")]
    UnexpectedCharacter { ch: char, at: Location },
    #[error("{at}: unterminated string literal")]
    UnterminatedString { at: Location },
    #[error("{at}: line break inside string literal (use `\\n`)")]
    NewlineInString { at: Location },
    #[error("{at}: invalid escape sequence `\\{escape}` in string literal")]
    InvalidEscape { escape: char, at: Location },
    #[error("{at}: invalid number literal `{text}`")]
    InvalidNumber { text: String, at: Location },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{at}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        at: Location,
    },
    #[error("{at}: enumeration must list at least one member")]
    EmptyEnumeration { at: Location },
    #[error("{at}: property `{name}` is listed more than once")]
    DuplicateProperty { name: String, at: Location },
    #[error("{at}: object patterns nested deeper than {limit} levels")]
    NestingTooDeep { limit: usize, at: Location },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("type `{0}` is not defined")]
    TypeNotFound(String),
    #[error("value does not match type `{type_name}`: {mismatch}")]
    Mismatch {
        type_name: String,
        mismatch: Mismatch,
    },
    #[error("at JSON path {path} → {message}")]
    Deserialize { path: String, message: String },
}
