//! Simulation benchmarks for colony_core.
//!
//! Run with: `cargo bench -p colony_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use colony_core::prelude::*;
use colony_test_utils::fixtures::{colonize_many, rich_engine, rich_state, seeded_rng};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Tick cost as the colony count grows.
pub fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for colonies in [0usize, 5, 20] {
        group.bench_with_input(
            BenchmarkId::from_parameter(colonies),
            &colonies,
            |b, &colonies| {
                let mut engine = rich_engine(1);
                colonize_many(&mut engine, colonies);
                let mut state = engine.state().clone();
                let mut rng = seeded_rng(2);
                let mut now = 0u64;
                b.iter(|| {
                    now += 1_000;
                    black_box(state.tick(now, &mut rng, 0.05))
                });
            },
        );
    }
    group.finish();
}

/// Exploration, which allocates a planet and draws from the RNG.
pub fn discover_benchmark(c: &mut Criterion) {
    c.bench_function("discover_planet", |b| {
        b.iter_batched(
            || (rich_state(0), seeded_rng(3)),
            |(mut state, mut rng)| {
                let _ = black_box(state.discover_planet(&mut rng, 0));
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Hashing the whole state, used by determinism checks.
pub fn state_hash_benchmark(c: &mut Criterion) {
    let mut engine = rich_engine(4);
    colonize_many(&mut engine, 10);
    let state: GameState = engine.state().clone();
    c.bench_function("state_hash", |b| b.iter(|| black_box(state.state_hash())));
}

criterion_group!(
    benches,
    tick_benchmark,
    discover_benchmark,
    state_hash_benchmark
);
criterion_main!(benches);
