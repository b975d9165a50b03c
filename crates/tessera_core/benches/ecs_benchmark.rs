//! # Registry Benchmark
//!
//! Entity churn and single-component access.
//!
//! Run with: `cargo bench --package tessera_core --bench ecs_benchmark`

#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{Entity, Registry, RegistryConfig};

const ENTITY_COUNT: usize = 100_000;

#[derive(Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

fn populated(count: usize) -> (Registry, Vec<Entity>) {
    let config = RegistryConfig {
        entity_capacity: count,
        storage_capacity: count,
    };
    let mut registry = Registry::with_config(&config);
    let entities = (0..count)
        .map(|i| {
            let entity = registry.create_entity();
            let f = i as f32;
            let _ = registry.add_component(entity, Position { x: f, y: f, z: f });
            entity
        })
        .collect();
    (registry, entities)
}

/// Benchmark: create N entities.
fn bench_create_entities(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_entities");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut registry = Registry::new();
                for _ in 0..count {
                    black_box(registry.create_entity());
                }
                registry.alive_count()
            });
        });
    }

    group.finish();
}

/// Benchmark: destroy then recreate a tenth of the entities.
fn bench_create_destroy_cycle(c: &mut Criterion) {
    let (mut registry, mut entities) = populated(ENTITY_COUNT);

    c.bench_function("create_destroy_cycle_10K", |b| {
        b.iter(|| {
            for entity in entities.iter_mut().step_by(10) {
                registry.destroy_entity(*entity);
                *entity = registry.create_entity();
                let _ = registry.add_component(*entity, Position { x: 0.0, y: 0.0, z: 0.0 });
            }
            black_box(registry.alive_count())
        });
    });
}

/// Benchmark: component access patterns.
fn bench_component_access(c: &mut Criterion) {
    let (mut registry, entities) = populated(ENTITY_COUNT);
    let mut group = c.benchmark_group("component_access");

    group.bench_function("dense_read_100K", |b| {
        b.iter(|| {
            let sum: f32 = registry
                .storage::<Position>()
                .map_or(0.0, |storage| storage.values().iter().map(|p| p.x).sum());
            black_box(sum)
        });
    });

    // Random access (worst case for cache)
    let indices: Vec<usize> = {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        (0..10_000)
            .map(|i| {
                let mut hasher = DefaultHasher::new();
                i.hash(&mut hasher);
                (hasher.finish() as usize) % ENTITY_COUNT
            })
            .collect()
    };

    group.bench_function("random_lookup_10K", |b| {
        b.iter(|| {
            let mut sum = 0.0_f32;
            for &i in &indices {
                if let Some(position) = registry.try_get_component::<Position>(entities[i]) {
                    sum += position.y;
                }
            }
            black_box(sum)
        });
    });

    group.bench_function("random_write_10K", |b| {
        b.iter(|| {
            for &i in &indices {
                if let Ok(position) = registry.get_component_mut::<Position>(entities[i]) {
                    position.z += 0.001;
                }
            }
            black_box(registry.alive_count())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_create_entities,
    bench_create_destroy_cycle,
    bench_component_access,
);
criterion_main!(benches);
