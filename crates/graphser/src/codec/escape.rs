// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Printable escaping for arbitrary strings.
//!
//! Code points 32..=123 pass through unchanged. Everything else is escaped,
//! with the escape tier picked by magnitude:
//!
//! ```text
//! '|' d          code 0..=93
//! '}' d d        code 94..=8929        (94 + two-digit value)
//! '~' <integer>  any larger code point (full variable-length integer)
//! ```

use super::varint::encode_u32_into;
use super::{decode_integer, digit_at, digit_char, BASE};
use crate::error::{Error, Result};

const SAFE_FIRST: u32 = 32;
const SAFE_LAST: u32 = 123;

const ESCAPE_ONE: char = '|';
const ESCAPE_TWO: char = '}';
const ESCAPE_WIDE: char = '~';

const TWO_DIGIT_BASE: u32 = BASE as u32;
const TWO_DIGIT_LAST: u32 = TWO_DIGIT_BASE + (BASE * BASE) as u32 - 1;

/// Append the escaped form of `s` to `out`.
pub fn encode_string_into(s: &str, out: &mut String) {
    for ch in s.chars() {
        let code = u32::from(ch);
        match code {
            SAFE_FIRST..=SAFE_LAST => out.push(ch),
            0..=93 => {
                out.push(ESCAPE_ONE);
                out.push(digit_char(u64::from(code)));
            }
            TWO_DIGIT_BASE..=TWO_DIGIT_LAST => {
                let rel = u64::from(code - TWO_DIGIT_BASE);
                out.push(ESCAPE_TWO);
                out.push(digit_char(rel / BASE));
                out.push(digit_char(rel % BASE));
            }
            _ => {
                out.push(ESCAPE_WIDE);
                encode_u32_into(code, out);
            }
        }
    }
}

/// Escape `s` into a fresh printable string.
pub fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    encode_string_into(s, &mut out);
    out
}

/// Reverse [`encode_string`], restoring the exact code-point sequence.
pub fn decode_string(text: &str) -> Result<String> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut offset = 0;

    while offset < bytes.len() {
        let start = offset;
        let code: i64 = match bytes[offset] {
            b'|' => {
                let d = digit_at(text, offset + 1)?;
                offset += 2;
                d as i64
            }
            b'}' => {
                let hi = digit_at(text, offset + 1)?;
                let lo = digit_at(text, offset + 2)?;
                offset += 3;
                i64::from(TWO_DIGIT_BASE) + (hi * BASE + lo) as i64
            }
            b'~' => {
                let (value, width) = decode_integer(text, offset + 1)?;
                offset += 1 + width;
                value
            }
            b if (SAFE_FIRST..=SAFE_LAST).contains(&u32::from(b)) => {
                offset += 1;
                i64::from(b)
            }
            _ => {
                let found = text
                    .get(offset..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                return Err(Error::InvalidDigit { offset, found });
            }
        };

        let ch = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(Error::InvalidCodePoint {
                offset: start,
                code,
            })?;
        out.push(ch);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_integer_into;

    fn from_codes(codes: &[u32]) -> String {
        codes.iter().filter_map(|&c| char::from_u32(c)).collect()
    }

    #[test]
    fn test_reference_code_points_roundtrip() {
        let s = from_codes(&[0, 32, 33, 126, 127, 255, 1000]);
        let encoded = encode_string(&s);
        assert_eq!(decode_string(&encoded).unwrap(), s);
    }

    #[test]
    fn test_output_is_printable_ascii() {
        let s = from_codes(&[0, 9, 10, 124, 125, 126, 0xE9, 0x4E2D, 0x1F600]);
        let encoded = encode_string(&s);
        assert!(encoded.bytes().all(|b| (32..=126).contains(&b)));
    }

    #[test]
    fn test_safe_text_passes_through() {
        assert_eq!(encode_string("hello world"), "hello world");
        assert_eq!(encode_string(""), "");
    }

    #[test]
    fn test_tier_selection() {
        // NUL: one-digit tier.
        assert_eq!(encode_string("\0"), "|!");
        // '~' (126): two-digit tier, 126 - 94 = 32 -> digits (0, 32).
        assert_eq!(encode_string("~"), "}!A");
        // Past 8929: wide tier.
        let wide = encode_string("\u{2300}");
        assert!(wide.starts_with('~'));
        assert_eq!(decode_string(&wide).unwrap(), "\u{2300}");
    }

    #[test]
    fn test_two_digit_tier_boundaries() {
        for code in [93u32, 94, 8929, 8930] {
            let s = from_codes(&[code]);
            assert_eq!(decode_string(&encode_string(&s)).unwrap(), s, "code {code}");
        }
    }

    #[test]
    fn test_truncated_escape_rejected() {
        assert_eq!(decode_string("|"), Err(Error::UnexpectedEnd { offset: 1 }));
        assert_eq!(decode_string("}!"), Err(Error::UnexpectedEnd { offset: 2 }));
    }

    #[test]
    fn test_surrogate_code_rejected() {
        let mut text = String::from("~");
        encode_integer_into(0xD800, &mut text).unwrap();
        assert_eq!(
            decode_string(&text),
            Err(Error::InvalidCodePoint {
                offset: 0,
                code: 0xD800
            })
        );
    }

    #[test]
    fn test_random_sweep() {
        let mut rng = fastrand::Rng::with_seed(0xE5C);
        for _ in 0..500 {
            let len = rng.usize(0..32);
            let s: String = (0..len)
                .filter_map(|_| char::from_u32(rng.u32(0..0x11_0000)))
                .collect();
            assert_eq!(decode_string(&encode_string(&s)).unwrap(), s);
        }
    }
}
