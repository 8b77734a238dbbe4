// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_precision_loss)] // Bench data generation
#![allow(clippy::cast_possible_truncation)] // Bench parameters
#![allow(clippy::missing_panics_doc)] // Benches panic on failure
#![allow(clippy::semicolon_if_nothing_returned)] // Benchmark code formatting

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graphser::codec::{decode_integer, decode_string, encode_integer, encode_string};
use graphser::{ObjRef, Stream, Value};

/// Array of `n` records, each sharing one `meta` object.
fn record_graph(n: usize) -> Value {
    let meta = ObjRef::from_pairs([
        ("source", Value::from("sensor")),
        ("version", Value::from(3)),
    ]);
    let records: Vec<Value> = (0..n)
        .map(|i| {
            Value::from(ObjRef::from_pairs([
                ("index", Value::from(i as f64)),
                ("value", Value::from(i as f64 * 0.25)),
                ("label", Value::from(format!("rec-{}", i % 16))),
                ("meta", Value::from(meta.clone())),
            ]))
        })
        .collect();
    Value::from(ObjRef::array(records))
}

// ============================================================================
// Scalar codec
// ============================================================================

/// Benchmark: integer encode + decode over all widths
fn bench_integer_codec(c: &mut Criterion) {
    let values: Vec<i64> = (0..9).map(|w| 94i64.pow(w) - 1).collect();
    c.bench_function("integer_codec_all_widths", |b| {
        b.iter(|| {
            for &v in &values {
                let text = encode_integer(black_box(v)).unwrap();
                black_box(decode_integer(&text, 0).unwrap());
            }
        })
    });
}

/// Benchmark: string escape + unescape (mixed tiers)
fn bench_string_codec(c: &mut Criterion) {
    let s = "plain ascii | with \t tabs, accents \u{e9}\u{e8} and \u{4e2d}\u{6587} \u{1f600}";
    c.bench_function("string_codec_mixed", |b| {
        b.iter(|| {
            let text = encode_string(black_box(s));
            black_box(decode_string(&text).unwrap());
        })
    });
}

// ============================================================================
// Graph engine
// ============================================================================

/// Benchmark: encode 1k shared-meta records to a table
fn bench_encode_table(c: &mut Criterion) {
    let value = record_graph(1000);
    let mut stream = Stream::new();
    c.bench_function("encode_table_1k", |b| {
        b.iter(|| black_box(stream.encode(black_box(&value)).unwrap()))
    });
}

/// Benchmark: decode the same table
fn bench_decode_table(c: &mut Criterion) {
    let value = record_graph(1000);
    let mut stream = Stream::new();
    let table = stream.encode(&value).unwrap();
    c.bench_function("decode_table_1k", |b| {
        b.iter(|| black_box(stream.decode(black_box(&table)).unwrap()))
    });
}

/// Benchmark: full packet roundtrip
fn bench_packet_roundtrip(c: &mut Criterion) {
    let value = record_graph(1000);
    let mut stream = Stream::new();
    c.bench_function("packet_roundtrip_1k", |b| {
        b.iter(|| {
            let text = stream.encode_packets(black_box(&value)).unwrap();
            black_box(stream.decode_packets(&text).unwrap())
        })
    });
}

criterion_group!(
    benches,
    bench_integer_codec,
    bench_string_codec,
    bench_encode_table,
    bench_decode_table,
    bench_packet_roundtrip
);
criterion_main!(benches);
