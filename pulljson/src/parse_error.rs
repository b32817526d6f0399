// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// Classification of grammar and engine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input ended in the middle of a token or before a value.
    PrematureEnd,
    /// A byte did not match the set the grammar expected here.
    UnexpectedToken,
    /// Malformed number literal: leading zero, bare sign, empty exponent.
    InvalidNumber,
    /// Number magnitude exceeds the target width.
    NumberOverflow,
    /// Integer does not fit in 16 signed bits.
    ShortOverflow,
    /// Unterminated string, bad escape sequence or invalid UTF-8.
    InvalidString,
    /// Non-whitespace input after a complete top-level value.
    TrailingGarbage,
    /// More than one byte was pushed back. Indicates an engine bug, not bad input.
    UnreadUnderflow,
    /// Nesting deeper than the configured limit while materializing a tree.
    DepthLimit,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Errors that can occur during JSON parsing.
///
/// Grammar errors and reader failures are kept apart: a `Syntax` error means
/// the bytes were wrong, an `Io` error means the bytes could not be fetched.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input violated the JSON grammar or a decoding constraint.
    #[error("{kind}: {message} at offset {offset}, near `{snippet}`")]
    Syntax {
        /// What went wrong.
        kind: ErrorKind,
        /// Absolute byte offset of the cursor when the error was detected.
        offset: usize,
        /// Human readable detail.
        message: String,
        /// Up to 10 bytes either side of the cursor, lossily decoded.
        snippet: String,
    },
    /// The underlying reader failed while refilling the buffer.
    #[error("reading input failed at offset {offset}: {source}")]
    Io {
        /// Absolute byte offset of the cursor when the read failed.
        offset: usize,
        /// The reader's error.
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// The grammar error kind, or `None` for reader failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ParseError::Syntax { kind, .. } => Some(*kind),
            ParseError::Io { .. } => None,
        }
    }

    /// Absolute byte offset at which the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Syntax { offset, .. } | ParseError::Io { offset, .. } => *offset,
        }
    }

    /// Input surrounding the cursor, if this is a grammar error.
    pub fn snippet(&self) -> Option<&str> {
        match self {
            ParseError::Syntax { snippet, .. } => Some(snippet),
            ParseError::Io { .. } => None,
        }
    }

    /// True when the error came from the reader rather than the grammar.
    pub fn is_io(&self) -> bool {
        matches!(self, ParseError::Io { .. })
    }
}
