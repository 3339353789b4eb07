//! Criterion micro-benchmarks for parse, stringify, and number formatting.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use packjson_arena::OwnedArena;
use packjson_bench::{filled_arena, flat_document, table_for};
use packjson_codec::{float_to_string, parse, stringify, stringify_into, stringify_length};
use packjson_store::JsonStore;
use packjson_test_utils::DEEP_JSON;

/// Benchmark: Parse a 128-member flat document into a pre-sized arena.
fn bench_parse_flat_128(c: &mut Criterion) {
    let text = flat_document(128);
    let mut arena = OwnedArena::new(16 * 1024, table_for(128)).unwrap();

    c.bench_function("codec_parse_flat_128", |b| {
        b.iter(|| {
            arena.clear();
            black_box(parse(&mut arena, &text).unwrap());
        });
    });
}

/// Benchmark: Parse a nested document through a growing store.
fn bench_parse_nested_store(c: &mut Criterion) {
    c.bench_function("codec_parse_nested_store", |b| {
        b.iter(|| {
            let mut store = JsonStore::new().unwrap();
            black_box(store.parse(DEEP_JSON).unwrap());
        });
    });
}

/// Benchmark: Stringify a 128-member arena into a `String`.
fn bench_stringify_128(c: &mut Criterion) {
    let arena = filled_arena(128);

    c.bench_function("codec_stringify_128", |b| {
        b.iter(|| black_box(stringify(&arena)));
    });
}

/// Benchmark: Stringify a 128-member arena into a reused slice.
fn bench_stringify_into_128(c: &mut Criterion) {
    let arena = filled_arena(128);
    let mut out = vec![0u8; stringify_length(&arena)];

    c.bench_function("codec_stringify_into_128", |b| {
        b.iter(|| black_box(stringify_into(&arena, &mut out).unwrap()));
    });
}

/// Benchmark: Format 1K floats.
fn bench_float_to_string_1k(c: &mut Criterion) {
    let values: Vec<f32> = (0..1000).map(|i| i as f32 * 0.731 - 365.0).collect();

    c.bench_function("codec_float_to_string_1k", |b| {
        b.iter(|| {
            for &v in &values {
                black_box(float_to_string(v));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_parse_flat_128,
    bench_parse_nested_store,
    bench_stringify_128,
    bench_stringify_into_128,
    bench_float_to_string_1k
);
criterion_main!(benches);
