//! # View Benchmark
//!
//! Single-storage passthrough against multi-storage intersection.
//!
//! Run with: `cargo bench --package tessera_core --bench view_benchmark`

#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::Registry;

const ENTITY_COUNT: usize = 100_000;

struct Position([f32; 3]);
struct Velocity([f32; 3]);
struct Frozen;

/// Every entity has a position, one in `stride` has a velocity, one in
/// `stride * 10` is frozen.
fn populated(stride: usize) -> Registry {
    let mut registry = Registry::new();
    for i in 0..ENTITY_COUNT {
        let entity = registry.create_entity();
        let _ = registry.add_component(entity, Position([0.0; 3]));
        if i % stride == 0 {
            let _ = registry.add_component(entity, Velocity([0.1, 0.2, 0.3]));
        }
        if i % (stride * 10) == 0 {
            let _ = registry.add_component(entity, Frozen);
        }
    }
    registry
}

/// Benchmark: one-component view, no filtering.
fn bench_single_view(c: &mut Criterion) {
    let mut registry = populated(1);

    c.bench_function("single_view_iter_100K", |b| {
        b.iter(|| {
            let view = match registry.create_view::<(Position,)>() {
                Ok(view) => view,
                Err(_) => return 0.0,
            };
            let sum: f32 = view.iter().map(|(_, (p,))| p.0[0]).sum();
            black_box(sum)
        });
    });
}

/// Benchmark: two-component view at several overlap ratios.
fn bench_pair_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_view_each_mut");

    for stride in [1, 4, 16] {
        let mut registry = populated(stride);
        group.bench_with_input(BenchmarkId::from_parameter(stride), &stride, |b, _| {
            b.iter(|| {
                if let Ok(mut view) = registry.create_view::<(Position, Velocity)>() {
                    view.each_mut(|_, (position, velocity): (&mut Position, &mut Velocity)| {
                        for axis in 0..3 {
                            position.0[axis] += velocity.0[axis] * 0.016;
                        }
                    });
                }
                black_box(registry.alive_count())
            });
        });
    }

    group.finish();
}

/// Benchmark: the smallest storage drives a three-way view.
fn bench_triple_view(c: &mut Criterion) {
    let mut registry = populated(2);

    c.bench_function("triple_view_count", |b| {
        b.iter(|| {
            let count = registry
                .create_view::<(Position, Velocity, Frozen)>()
                .map_or(0, |view| view.len());
            black_box(count)
        });
    });
}

criterion_group!(benches, bench_single_view, bench_pair_view, bench_triple_view);
criterion_main!(benches);
