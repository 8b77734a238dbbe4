// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Variable-length signed integers over the base-94 alphabet.
//!
//! ## Format
//!
//! ```text
//! 0..=76          one char:  digit(n)
//! otherwise       marker + 2..=9 digits of |n|, most significant first
//!                 marker = 77 + (width - 2)   for n >= 0
//!                 marker = 85 + (width - 2)   for n <  0
//! ```
//!
//! Sign and width are both recoverable from the first character, so a reader
//! never needs an external length to find where an integer ends.

use super::{digit_at, digit_char, BASE};
use crate::error::{Error, Result};

/// Largest value that fits in a single character.
const DIRECT_MAX: u64 = 76;

/// First marker for non-negative multi-digit integers.
const POSITIVE_MARKER: u64 = 77;

/// First marker for negative integers.
const NEGATIVE_MARKER: u64 = 85;

/// Minimum digit count after a marker.
const MIN_DIGITS: usize = 2;

/// Maximum digit count after a marker.
pub const MAX_INTEGER_DIGITS: usize = 9;

/// Largest encodable magnitude: 94^9 - 1.
pub const MAX_INTEGER: i64 = 572_994_802_228_616_703;

/// Number of base-94 digits needed for `magnitude` (at least [`MIN_DIGITS`]).
fn digit_count(mut magnitude: u64) -> usize {
    let mut digits = 0;
    while magnitude > 0 {
        magnitude /= BASE;
        digits += 1;
    }
    digits.max(MIN_DIGITS)
}

/// Encoded width in chars of `value`, without encoding it.
pub fn integer_width(value: i64) -> Result<usize> {
    if (0..=DIRECT_MAX as i64).contains(&value) {
        return Ok(1);
    }
    if value.unsigned_abs() > MAX_INTEGER as u64 {
        return Err(Error::IntegerOutOfRange(i128::from(value)));
    }
    Ok(1 + digit_count(value.unsigned_abs()))
}

/// Append the encoding of `value` to `out`.
pub fn encode_integer_into(value: i64, out: &mut String) -> Result<()> {
    if value.unsigned_abs() > MAX_INTEGER as u64 {
        return Err(Error::IntegerOutOfRange(i128::from(value)));
    }
    push_in_range(value, out);
    Ok(())
}

/// Append a `u32`; always within range.
pub(crate) fn encode_u32_into(value: u32, out: &mut String) {
    push_in_range(i64::from(value), out);
}

/// Caller guarantees `|value| <= MAX_INTEGER`.
fn push_in_range(value: i64, out: &mut String) {
    if (0..=DIRECT_MAX as i64).contains(&value) {
        out.push(digit_char(value as u64));
        return;
    }

    let magnitude = value.unsigned_abs();
    let width = digit_count(magnitude);
    let base_marker = if value < 0 {
        NEGATIVE_MARKER
    } else {
        POSITIVE_MARKER
    };
    out.push(digit_char(base_marker + (width - MIN_DIGITS) as u64));

    let mut digits = [0u64; MAX_INTEGER_DIGITS];
    let mut rest = magnitude;
    for slot in digits[..width].iter_mut().rev() {
        *slot = rest % BASE;
        rest /= BASE;
    }
    for &digit in &digits[..width] {
        out.push(digit_char(digit));
    }
}

/// Encode `value` into a fresh string.
pub fn encode_integer(value: i64) -> Result<String> {
    let mut out = String::with_capacity(1 + MAX_INTEGER_DIGITS);
    encode_integer_into(value, &mut out)?;
    Ok(out)
}

/// Decode the integer starting at byte `offset` of `text`.
///
/// Returns `(value, width)` where `width` is the number of chars consumed.
pub fn decode_integer(text: &str, offset: usize) -> Result<(i64, usize)> {
    let head = digit_at(text, offset)?;
    if head <= DIRECT_MAX {
        return Ok((head as i64, 1));
    }

    let (negative, width) = match head {
        h if (POSITIVE_MARKER..NEGATIVE_MARKER).contains(&h) => {
            (false, (h - POSITIVE_MARKER) as usize + MIN_DIGITS)
        }
        h if (NEGATIVE_MARKER..NEGATIVE_MARKER + 8).contains(&h) => {
            (true, (h - NEGATIVE_MARKER) as usize + MIN_DIGITS)
        }
        _ => {
            return Err(Error::InvalidDigit {
                offset,
                found: digit_char(head),
            })
        }
    };

    let mut magnitude: u64 = 0;
    for i in 0..width {
        // 94^9 - 1 < 2^63, so this never overflows.
        magnitude = magnitude * BASE + digit_at(text, offset + 1 + i)?;
    }

    let value = magnitude as i64;
    Ok((if negative { -value } else { value }, 1 + width))
}
