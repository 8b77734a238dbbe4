// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for graphser.
//!
//! All parsing is safe: malformed input returns `Err`, never panics.

use std::fmt;

/// Result type for graphser operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by the codecs, the packet framer and the graph engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input ended in the middle of an integer, escape or packet.
    UnexpectedEnd { offset: usize },
    /// A character outside the base-94 alphabet where a digit was expected.
    InvalidDigit { offset: usize, found: char },
    /// Integer magnitude does not fit in nine base-94 digits.
    IntegerOutOfRange(i128),
    /// Escape sequence decodes to something that is not a Unicode scalar value.
    InvalidCodePoint { offset: usize, code: i64 },
    /// Float payload is not parseable decimal text.
    InvalidFloat { text: String },
    /// Packet type tag outside 0..=11.
    UnknownTypeTag(u8),
    /// Packet length prefix points past the end of the text.
    LengthOverrun {
        offset: usize,
        length: usize,
        remaining: usize,
    },
    /// Packet stream or table has no trailing root index.
    MissingRoot,
    /// An entry references a table position that does not exist.
    IndexOutOfRange { index: usize, len: usize },
    /// A scalar payload was expected at this position.
    NotAScalar { index: usize },
    /// Packet payload does not match the layout of its type tag.
    MalformedEntry { tag: u8, reason: String },
    /// Pattern text is not of the form `/source/flags`.
    InvalidPattern(String),
    /// Callable source could not be turned back into a callable.
    Reconstruction(String),
    /// Encoder recursion went deeper than the configured bound.
    DepthExceeded(usize),
    /// Table holds more entries than the configured bound.
    TableTooLarge { entries: usize, max: usize },
    /// Configuration validation error.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd { offset } => {
                write!(f, "unexpected end of input at offset {}", offset)
            }
            Self::InvalidDigit { offset, found } => {
                write!(f, "invalid base-94 digit {:?} at offset {}", found, offset)
            }
            Self::IntegerOutOfRange(v) => write!(f, "integer out of encodable range: {}", v),
            Self::InvalidCodePoint { offset, code } => {
                write!(f, "invalid code point {} escaped at offset {}", code, offset)
            }
            Self::InvalidFloat { text } => write!(f, "invalid float payload: {:?}", text),
            Self::UnknownTypeTag(tag) => write!(f, "unknown type tag: {}", tag),
            Self::LengthOverrun {
                offset,
                length,
                remaining,
            } => write!(
                f,
                "packet at offset {} declares {} chars but only {} remain",
                offset, length, remaining
            ),
            Self::MissingRoot => write!(f, "missing root index"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "table index out of range: {} >= {}", index, len)
            }
            Self::NotAScalar { index } => write!(f, "table index {} is not a scalar", index),
            Self::MalformedEntry { tag, reason } => {
                write!(f, "malformed entry (tag {}): {}", tag, reason)
            }
            Self::InvalidPattern(text) => write!(f, "invalid pattern text: {:?}", text),
            Self::Reconstruction(msg) => write!(f, "callable reconstruction failed: {}", msg),
            Self::DepthExceeded(max) => write!(f, "value nesting exceeds max depth {}", max),
            Self::TableTooLarge { entries, max } => {
                write!(f, "table has {} entries, max is {}", entries, max)
            }
            Self::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
