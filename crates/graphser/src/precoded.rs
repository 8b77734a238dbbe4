// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Precoded constants and the value classifier.
//!
//! The first nine table positions are implied and never stored:
//!
//! | Index | Value       |
//! |-------|-------------|
//! | 0     | undefined   |
//! | 1     | null        |
//! | 2     | false       |
//! | 3     | true        |
//! | 4     | NaN         |
//! | 5     | -Infinity   |
//! | 6     | +Infinity   |
//! | 7     | 0           |
//! | 8     | ""          |

use crate::value::{ObjRef, OpaqueRef, Value};

/// Number of implied table positions.
pub const PRECODED_COUNT: usize = 9;

pub const UNDEFINED: usize = 0;
pub const NULL: usize = 1;
pub const FALSE: usize = 2;
pub const TRUE: usize = 3;
pub const NAN: usize = 4;
pub const NEG_INFINITY: usize = 5;
pub const POS_INFINITY: usize = 6;
pub const ZERO: usize = 7;
pub const EMPTY_STRING: usize = 8;

/// Largest integer carried as an exact integer scalar (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Fixed index of `value` if it strictly equals one of the constants.
///
/// NaN is matched by NaN test; `-0` matches `0`.
pub fn precoded_index(value: &Value) -> Option<usize> {
    match value {
        Value::Undefined => Some(UNDEFINED),
        Value::Null => Some(NULL),
        Value::Bool(false) => Some(FALSE),
        Value::Bool(true) => Some(TRUE),
        Value::Number(n) if n.is_nan() => Some(NAN),
        Value::Number(n) if *n == f64::NEG_INFINITY => Some(NEG_INFINITY),
        Value::Number(n) if *n == f64::INFINITY => Some(POS_INFINITY),
        Value::Number(n) if *n == 0.0 => Some(ZERO),
        Value::String(s) if s.is_empty() => Some(EMPTY_STRING),
        _ => None,
    }
}

/// The constant stored at `index`, if `index` is precoded.
pub fn precoded_value(index: usize) -> Option<Value> {
    let value = match index {
        UNDEFINED => Value::Undefined,
        NULL => Value::Null,
        FALSE => Value::Bool(false),
        TRUE => Value::Bool(true),
        NAN => Value::Number(f64::NAN),
        NEG_INFINITY => Value::Number(f64::NEG_INFINITY),
        POS_INFINITY => Value::Number(f64::INFINITY),
        ZERO => Value::Number(0.0),
        EMPTY_STRING => Value::String(String::new()),
        _ => return None,
    };
    Some(value)
}

/// Memoization key for a primitive scalar payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarKey {
    Integer(i64),
    /// Raw bits; only finite, non-integral or out-of-safe-range values.
    Float(u64),
    Text(String),
}

impl ScalarKey {
    fn for_number(n: f64) -> Self {
        if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            Self::Integer(n as i64)
        } else {
            Self::Float(n.to_bits())
        }
    }
}

/// Encoding class of a value.
#[derive(Debug)]
pub enum Class<'a> {
    /// One of the nine constants.
    Precoded(usize),
    /// Value-type number or string: stored once per pass as a payload.
    Scalar(ScalarKey),
    /// Structural object: gets a graph node.
    Reference(&'a ObjRef),
    /// Anything else: stream-scoped identity.
    Opaque(&'a OpaqueRef),
}

/// Classify `value` for encoding.
pub fn classify(value: &Value) -> Class<'_> {
    match value {
        Value::Undefined => Class::Precoded(UNDEFINED),
        Value::Null => Class::Precoded(NULL),
        Value::Bool(b) => Class::Precoded(if *b { TRUE } else { FALSE }),
        Value::Number(n) => match precoded_index(value) {
            Some(index) => Class::Precoded(index),
            None => Class::Scalar(ScalarKey::for_number(*n)),
        },
        Value::String(s) if s.is_empty() => Class::Precoded(EMPTY_STRING),
        Value::String(s) => Class::Scalar(ScalarKey::Text(s.clone())),
        Value::Object(obj) => Class::Reference(obj),
        Value::Opaque(opaque) => Class::Opaque(opaque),
    }
}
