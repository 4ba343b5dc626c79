#![allow(dead_code)]
//! Parallel scheduler throughput: many independent heavy systems against one
//! level (no conflicts, should scale with cores) vs. a fully serialized
//! write-conflict chain (should run level-by-level regardless of feature).

use chunked_ecs::{CommandBuffer, EcsConfig, Result, Schedule, System, SystemAccess, SystemScheduler, World};
use criterion::{criterion_group, criterion_main, Criterion};

struct HeavySystem {
    access: SystemAccess,
}

impl System for HeavySystem {
    fn name(&self) -> &'static str {
        "heavy"
    }

    fn access(&self) -> SystemAccess {
        self.access.clone()
    }

    fn run(&mut self, _world: &World, _commands: &mut CommandBuffer) -> Result<()> {
        let mut x = 0u64;
        for i in 0..100_000u64 {
            x = x.wrapping_add(i);
        }
        std::hint::black_box(x);
        Ok(())
    }
}

fn bench_independent_systems(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_independent");

    group.bench_function("100_systems_one_level", |b| {
        b.iter_batched(
            || {
                let mut scheduler = SystemScheduler::new(Schedule::new());
                for _ in 0..100 {
                    scheduler.add_system(Box::new(HeavySystem {
                        access: SystemAccess::empty(),
                    }));
                }
                let world = World::new(EcsConfig::default());
                (scheduler, world)
            },
            |(mut scheduler, world)| {
                scheduler.run(&world).unwrap();
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_conflicting_chain(c: &mut Criterion) {
    use chunked_ecs::ComponentTypeId;

    let mut group = c.benchmark_group("scheduler_conflicting");

    group.bench_function("10_systems_all_writing_same_component", |b| {
        b.iter_batched(
            || {
                let mut scheduler = SystemScheduler::new(Schedule::new());
                for _ in 0..10 {
                    scheduler.add_system(Box::new(HeavySystem {
                        access: SystemAccess {
                            reads: vec![],
                            writes: vec![ComponentTypeId(0)],
                        },
                    }));
                }
                let world = World::new(EcsConfig::default());
                (scheduler, world)
            },
            |(mut scheduler, world)| {
                scheduler.run(&world).unwrap();
            },
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_independent_systems, bench_conflicting_chain);
criterion_main!(benches);
