//! Benchmark for unique key validation.
//!
//! Compares a cold pass (index rebuild) with incremental passes after a
//! handful of edits, at different table sizes.

#![allow(clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tablekey_core::{
    ColumnRange, KeyItem, Structure, TableContents, UniqueKey, ValidationConfig,
};

fn structure() -> Structure {
    Structure::new("tariffs")
        .with_column("code", "String")
        .with_column("validFrom", "Integer")
        .with_column("validTo", "Integer")
        .with_unique_key(UniqueKey::new("code", vec![KeyItem::column("code")]))
        .with_unique_key(UniqueKey::new(
            "validity",
            vec![
                KeyItem::column("code"),
                KeyItem::range(ColumnRange::two_column("period", "validFrom", "validTo")),
            ],
        ))
}

/// Deterministic rows: 64 codes, ranges spread so that some overlap.
fn create_table(size: usize) -> TableContents {
    let config = ValidationConfig {
        automatic_range_threshold: usize::MAX,
        ..ValidationConfig::default()
    };
    let mut table = TableContents::with_config("bench", structure(), config);
    for i in 0..size {
        let from = (i * 7919) % 100_000;
        let to = from + (i % 50);
        table
            .push_row(vec![
                Some(format!("C{}", i % 64)),
                Some(from.to_string()),
                Some(to.to_string()),
            ])
            .expect("row width");
    }
    table
}

fn bench_cold_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation_cold");
    group.sample_size(20);

    for size in [1_000, 10_000, 50_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || create_table(size),
                |mut table| black_box(table.validate().messages.len()),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_incremental_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation_incremental");
    group.sample_size(20);

    for size in [1_000, 10_000, 50_000] {
        let mut table = create_table(size);
        table.validate();
        let ids: Vec<_> = table.rows().ids().step_by(size / 10).collect();
        let mut round = 0u64;

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                round += 1;
                for id in &ids {
                    table
                        .set_value(*id, 1, ((round * 13) % 100_000).to_string())
                        .expect("row exists");
                }
                black_box(table.validate().messages.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cold_validation, bench_incremental_validation);
criterion_main!(benches);
