//! Benchmarks for type mapping and column inference
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use type_mapping_core::{
    CanonicalType, InferenceOptions, MapMode, MapperOptions, TypeMeta, create_scoped_context,
    encode_cache_key, get_compat_level, infer_column_type, map_source_type, with_scoped_context,
};

/// Generate sample column values for benchmarking
fn generate_samples(kind: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match kind {
            "integer" => format!("{}", i * 37),
            "date" => format!("2024-{:02}-{:02}", 1 + (i % 12), 1 + (i % 28)),
            "uuid" => format!("550e8400-e29b-41d4-a716-{:012}", i),
            "enum" => ["active", "inactive", "pending"][i % 3].to_string(),
            _ => format!("free text row number {}", i),
        })
        .collect()
}

/// Benchmark the pure classification path, scoped so no run sees
/// another's cache
fn bench_map_source_type(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_source_type");

    let test_cases = vec![
        ("exact", "integer", None),
        ("alias", "int4", None),
        ("with_meta", "varchar", Some(TypeMeta::with_max_length(500))),
        ("array", "integer[]", None),
        ("unknown_loose", "mystery_type", None),
    ];

    for (name, source_type, meta) in test_cases {
        group.bench_with_input(
            BenchmarkId::new("uncached", name),
            &(source_type, meta),
            |b, (source_type, meta)| {
                b.iter(|| {
                    let ctx = create_scoped_context();
                    with_scoped_context(&ctx, || {
                        black_box(map_source_type(
                            source_type,
                            meta.as_ref(),
                            &MapperOptions::default(),
                        ))
                    })
                });
            },
        );
    }

    // Hit path: one warm entry, repeated lookups
    group.bench_function("cached_hit", |b| {
        let ctx = create_scoped_context();
        with_scoped_context(&ctx, || {
            map_source_type("integer", None, &MapperOptions::default()).unwrap();
        });
        b.iter(|| {
            with_scoped_context(&ctx, || {
                black_box(map_source_type("integer", None, &MapperOptions::default()))
            })
        });
    });

    group.finish();
}

/// Benchmark column inference with varying sample counts
fn bench_infer_column_type(c: &mut Criterion) {
    let mut group = c.benchmark_group("infer_column_type");

    for kind in ["integer", "date", "uuid", "enum", "text"] {
        for count in [10usize, 100, 1000] {
            let values = generate_samples(kind, count);
            group.throughput(Throughput::Elements(count as u64));
            group.bench_with_input(
                BenchmarkId::new(kind, count),
                &values,
                |b, values| {
                    b.iter(|| black_box(infer_column_type(values, &InferenceOptions::default())));
                },
            );
        }
    }

    group.finish();
}

/// Benchmark the cache key encoding and the compatibility lookup
fn bench_small_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");

    let meta = TypeMeta::with_max_length(255);
    group.bench_function("encode_cache_key", |b| {
        b.iter(|| black_box(encode_cache_key("VarChar", Some(&meta), MapMode::Loose)));
    });

    group.bench_function("compat_matrix_full_scan", |b| {
        b.iter(|| {
            for from in CanonicalType::ALL {
                for to in CanonicalType::ALL {
                    black_box(get_compat_level(from, to));
                }
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_map_source_type,
    bench_infer_column_type,
    bench_small_primitives
);
criterion_main!(benches);
