// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for packet stream decoding
//!
//! Feeds arbitrary text to the packet framer, the table parser and the
//! graph decoder. None of these operations should panic on any input.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // ----------------------------------------------------------------
    // 1. Sequential unframe - must not panic
    // ----------------------------------------------------------------
    let mut offset = 0;
    while offset < text.len() {
        match graphser::unframe(text, offset) {
            Ok(packet) => offset = packet.next_offset,
            Err(_) => break,
        }
    }

    // ----------------------------------------------------------------
    // 2. Table parse + decode - must not panic
    // ----------------------------------------------------------------
    let config = graphser::StreamConfig {
        max_entries: 4096,
        ..Default::default()
    };
    if let Ok(stream) = graphser::Stream::with_config(config) {
        if let Ok(value) = stream.decode_packets(text) {
            // Break decoded cycles so the fuzzer does not report leaks.
            if let Some(obj) = value.as_object() {
                obj.borrow_mut().clear();
            }
        }
    }
});
