// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar codec: printable base-94 encodings for integers, floats and strings.
//!
//! Every encoded character lies in the printable ASCII range, so encoded
//! lengths measured in chars and in bytes are identical.
//!
//! ## Alphabet
//!
//! ```text
//!  code   33 ('!') ..................................... 126 ('~')
//!  digit   0 ......... 76 | 77 .... 84 | 85 .... 92 | 93
//!          direct ints    | +marker    | -marker    | (unused as int head)
//! ```

mod escape;
mod varint;

pub use escape::{decode_string, encode_string, encode_string_into};
pub use varint::{
    decode_integer, encode_integer, encode_integer_into, integer_width, MAX_INTEGER,
    MAX_INTEGER_DIGITS,
};

use crate::error::{Error, Result};

/// Number of symbols in the digit alphabet.
pub const BASE: u64 = 94;

/// Code of the first alphabet symbol (`'!'`).
pub const ALPHABET_START: u32 = 33;

/// Map a base-94 digit to its printable character.
#[inline]
pub(crate) fn digit_char(digit: u64) -> char {
    debug_assert!(digit < BASE);
    // Always within '!'..='~'.
    char::from(ALPHABET_START as u8 + digit as u8)
}

/// Read the base-94 digit at byte `offset` of `text`.
#[inline]
pub(crate) fn digit_at(text: &str, offset: usize) -> Result<u64> {
    let byte = *text
        .as_bytes()
        .get(offset)
        .ok_or(Error::UnexpectedEnd { offset })?;
    let code = u32::from(byte);
    if !(ALPHABET_START..ALPHABET_START + BASE as u32).contains(&code) {
        let found = text
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Err(Error::InvalidDigit { offset, found });
    }
    Ok(u64::from(code - ALPHABET_START))
}

/// Encode a float as shortest round-trip decimal text.
///
/// Non-finite values never reach this path: they are precoded constants.
pub fn encode_float(value: f64) -> String {
    format!("{:e}", value)
}

/// Decode decimal float text produced by [`encode_float`].
pub fn decode_float(text: &str) -> Result<f64> {
    text.parse::<f64>().map_err(|_| Error::InvalidFloat {
        text: text.to_string(),
    })
}
