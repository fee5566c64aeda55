//! # Errors
//!
//! Recoverable errors reported while tokenizing a document, parsing token
//! values or reading files. Misusing an accessor on a token of the wrong
//! type is a caller bug and panics instead.
use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::tokenizer::TokenType;

/// Where in a document an error happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Label of the document, usually the file name or `<in>`
    pub label: String,
    /// Byte offset into the source text
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in bytes
    pub column: usize,
}

impl Location {
    /// Computes line and column of `offset` in `text`.
    pub(crate) fn new(label: &str, text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = &text.as_bytes()[..offset];
        let line_start = before
            .iter()
            .rposition(|&byte| byte == b'\n')
            .map_or(0, |newline| newline + 1);
        Self {
            label: label.to_string(),
            offset,
            line: before.iter().filter(|&&byte| byte == b'\n').count() + 1,
            column: offset - line_start + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.label, self.line, self.column)
    }
}

/// Represents errors that can occur while tokenizing or parsing JSON.
#[derive(Debug)]
pub enum JsonError {
    /// Structurally invalid JSON text. No document is produced.
    Syntax {
        /// What was expected and what was found instead
        message: String,
        /// Where tokenizing stopped
        location: Location,
    },
    /// Objects and arrays nested deeper than the configured limit.
    DepthLimit {
        /// The configured limit
        limit: usize,
        /// Opening bracket that went over the limit
        location: Location,
    },
    /// A token value failed validation or conversion. Tokens parsed earlier
    /// in the same call keep their new state.
    InvalidValue {
        /// Description of the offending value
        message: String,
        /// Start of the offending token
        location: Location,
    },
    /// A token had a different type than the operation requires.
    UnexpectedType {
        /// Type the operation works on
        expected: TokenType,
        /// Actual type of the token
        found: TokenType,
        /// Start of the token
        location: Location,
    },
    /// The input file could not be read.
    Io {
        /// Path of the file
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// The input file is not valid UTF-8.
    InvalidUtf8 {
        /// Path of the file
        path: PathBuf,
        /// Byte offset of the first invalid sequence
        offset: usize,
    },
}

impl JsonError {
    /// Location in the document, if the error is tied to one.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        match self {
            Self::Syntax { location, .. }
            | Self::DepthLimit { location, .. }
            | Self::InvalidValue { location, .. }
            | Self::UnexpectedType { location, .. } => Some(location),
            Self::Io { .. } | Self::InvalidUtf8 { .. } => None,
        }
    }
}

impl Error for JsonError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { message, location }
            | Self::InvalidValue { message, location } => {
                write!(f, "{location}: {message}")
            }
            Self::DepthLimit { limit, location } => {
                write!(f, "{location}: nesting deeper than {limit} levels")
            }
            Self::UnexpectedType {
                expected,
                found,
                location,
            } => {
                write!(f, "{location}: expected a {expected} but got a {found}")
            }
            Self::Io { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            Self::InvalidUtf8 { path, offset } => {
                write!(
                    f,
                    "{}: invalid UTF-8 at byte {offset}",
                    path.display()
                )
            }
        }
    }
}
