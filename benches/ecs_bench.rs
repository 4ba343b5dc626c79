#![allow(dead_code)]
//! Core ECS benchmarks: spawning, lookup, despawn, archetype segregation,
//! and query iteration over chunked storage.
//!
//! Run with: cargo bench --bench ecs_bench

use chunked_ecs::{EcsConfig, World};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

#[derive(Debug, Copy, Clone)]
struct Position {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Copy, Clone)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, Copy, Clone)]
struct Health(u32);

#[derive(Debug, Copy, Clone)]
struct Damage(f32);

fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("spawn_1k_single_component", |b| {
        b.iter(|| {
            let world = World::new(EcsConfig::default());
            for i in 0..1_000 {
                let _ = world.spawn((Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },));
            }
        });
    });

    group.bench_function("spawn_1k_two_components", |b| {
        b.iter(|| {
            let world = World::new(EcsConfig::default());
            for i in 0..1_000 {
                let _ = world.spawn((
                    Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                    Velocity {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    },
                ));
            }
        });
    });

    group.bench_function("spawn_1k_four_components", |b| {
        b.iter(|| {
            let world = World::new(EcsConfig::default());
            for i in 0..1_000 {
                let _ = world.spawn((
                    Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                    Velocity {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    },
                    Health(100),
                    Damage(10.5),
                ));
            }
        });
    });

    group.finish();
}

fn bench_spawn_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn_scaling");

    for count in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("spawn_with_3_components", count),
            count,
            |b, &count| {
                b.iter(|| {
                    let world = World::new(EcsConfig::default());
                    for i in 0..count {
                        let _ = world.spawn((
                            Position {
                                x: i as f32,
                                y: 0.0,
                                z: 0.0,
                            },
                            Velocity {
                                x: 1.0,
                                y: 0.0,
                                z: 0.0,
                            },
                            Health(100),
                        ));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for count in [1_000, 10_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::new("get_component", count),
            count,
            |b, &count| {
                let world = World::new(EcsConfig::default());
                let entities: Vec<_> = (0..count)
                    .map(|i| {
                        world
                            .spawn((
                                Position {
                                    x: i as f32,
                                    y: 0.0,
                                    z: 0.0,
                                },
                                Health(100),
                            ))
                            .unwrap()
                    })
                    .collect();

                b.iter(|| {
                    for &entity in &entities {
                        black_box(world.get_component::<Position>(entity).ok());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_despawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("despawn");

    group.bench_function("despawn_1k_entities", |b| {
        b.iter_batched(
            || {
                let world = World::new(EcsConfig::default());
                let entities: Vec<_> = (0..1_000)
                    .map(|i| {
                        world
                            .spawn((
                                Position {
                                    x: i as f32,
                                    y: 0.0,
                                    z: 0.0,
                                },
                                Health(100),
                            ))
                            .unwrap()
                    })
                    .collect();
                (world, entities)
            },
            |(world, entities)| {
                for entity in entities {
                    let _ = world.despawn(entity);
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_archetype_segregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("archetype");

    group.bench_function("segregation_1k_across_4_archetypes", |b| {
        b.iter(|| {
            let world = World::new(EcsConfig::default());

            for i in 0..250 {
                let _ = world.spawn((
                    Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                    Velocity {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    },
                ));
            }

            for i in 0..250 {
                let _ = world.spawn((
                    Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                    Health(100),
                ));
            }

            for i in 0..250 {
                let _ = world.spawn((
                    Position {
                        x: i as f32,
                        y: 0.0,
                        z: 0.0,
                    },
                    Velocity {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    },
                    Health(100),
                ));
            }

            for i in 0..250 {
                let _ = world.spawn((Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },));
            }
        });
    });

    group.finish();
}

fn bench_query_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    group.bench_function("query_builder_construction_10k", |b| {
        let world = World::new(EcsConfig::default());
        for i in 0..10_000 {
            let _ = world.spawn((
                Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },
                Velocity {
                    x: 1.0,
                    y: 0.0,
                    z: 0.0,
                },
                Health(100),
            ));
        }

        b.iter(|| {
            let query = world.query().with::<Position>().with::<Velocity>();
            black_box(query.archetype_count());
        });
    });

    group.bench_function("chunk_iteration_100k", |b| {
        let world = World::new(EcsConfig::default());
        for i in 0..100_000 {
            let _ = world.spawn((
                Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },
                Velocity {
                    x: 1.0,
                    y: 0.0,
                    z: 0.0,
                },
                Health(100),
            ));
        }

        // warm the archetype-index query cache.
        let _ = world.query().with::<Position>().with::<Velocity>().count();

        b.iter(|| {
            let mut visited = 0usize;
            world
                .query()
                .with::<Position>()
                .with::<Velocity>()
                .for_each_chunk(|chunk| {
                    visited += chunk.count();
                });
            black_box(visited);
        });
    });

    group.finish();
}

fn bench_world_counters(c: &mut Criterion) {
    c.bench_function("entity_count_10k", |b| {
        let world = World::new(EcsConfig::default());
        for i in 0..10_000 {
            let _ = world.spawn((Position {
                x: i as f32,
                y: 0.0,
                z: 0.0,
            },));
        }

        b.iter(|| {
            black_box(world.entity_count());
        });
    });

    c.bench_function("archetype_count_mixed", |b| {
        let world = World::new(EcsConfig::default());

        for i in 0..100 {
            let _ = world.spawn((
                Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },
                Velocity {
                    x: 1.0,
                    y: 0.0,
                    z: 0.0,
                },
            ));
        }

        for i in 0..100 {
            let _ = world.spawn((
                Position {
                    x: i as f32,
                    y: 0.0,
                    z: 0.0,
                },
                Health(100),
            ));
        }

        for i in 0..100 {
            let _ = world.spawn((Position {
                x: i as f32,
                y: 0.0,
                z: 0.0,
            },));
        }

        b.iter(|| {
            black_box(world.archetype_count());
        });
    });
}

criterion_group!(
    benches,
    bench_spawn,
    bench_spawn_scaling,
    bench_lookup,
    bench_despawn,
    bench_archetype_segregation,
    bench_query_iteration,
    bench_world_counters
);

criterion_main!(benches);
