// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for the scalar codec
//!
//! Decoding arbitrary text must not panic; escaping arbitrary strings must
//! round trip exactly.

#![no_main]

use graphser::codec::{decode_integer, decode_string, encode_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = decode_integer(text, 0);
    let _ = decode_string(text);

    let escaped = encode_string(text);
    assert!(escaped.bytes().all(|b| (32..=126).contains(&b)));
    assert_eq!(decode_string(&escaped).as_deref(), Ok(text));
});
