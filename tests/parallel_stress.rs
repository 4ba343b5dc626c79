use std::sync::Arc;
use std::thread;

use chunked_ecs::{EcsConfig, World};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pos(f32, f32);
#[derive(Debug, Clone, Copy, PartialEq)]
struct Vel(f32, f32);
#[derive(Debug, Clone, Copy, PartialEq)]
struct Health(i32);

#[test]
fn concurrent_spawns_from_multiple_threads_all_land_as_distinct_live_entities() {
    let world = Arc::new(World::new(EcsConfig::default()));
    let threads = 8;
    let per_thread = 500;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let world = world.clone();
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(per_thread);
                for i in 0..per_thread {
                    ids.push(
                        world
                            .spawn((Pos(t as f32, i as f32), Vel(1.0, 0.0)))
                            .unwrap(),
                    );
                }
                ids
            })
        })
        .collect();

    let mut all_ids = Vec::new();
    for handle in handles {
        all_ids.extend(handle.join().unwrap());
    }

    assert_eq!(all_ids.len(), threads * per_thread);
    all_ids.sort();
    all_ids.dedup();
    assert_eq!(
        all_ids.len(),
        threads * per_thread,
        "every spawned entity id must be unique across threads"
    );
    assert_eq!(world.entity_count(), threads * per_thread);
}

#[test]
fn a_query_running_concurrently_with_spawns_on_other_archetypes_never_panics() {
    let world = Arc::new(World::new(EcsConfig::default()));
    for i in 0..1000 {
        world.spawn((Pos(i as f32, 0.0), Vel(1.0, 0.0))).unwrap();
    }

    let reader = {
        let world = world.clone();
        thread::spawn(move || {
            for _ in 0..200 {
                let mut visited = 0usize;
                world
                    .query()
                    .with::<Pos>()
                    .with::<Vel>()
                    .for_each_chunk(|chunk| visited += chunk.count());
                assert!(visited >= 1000);
            }
        })
    };

    let writer = {
        let world = world.clone();
        thread::spawn(move || {
            for i in 0..500 {
                world.spawn((Pos(i as f32, 1.0), Health(100))).unwrap();
            }
        })
    };

    reader.join().unwrap();
    writer.join().unwrap();
    assert_eq!(world.entity_count(), 1500);
}

#[test]
fn concurrent_add_component_calls_on_disjoint_entities_all_succeed() {
    let world = Arc::new(World::new(EcsConfig::default()));
    let entities: Vec<_> = (0..400)
        .map(|i| world.spawn((Pos(i as f32, 0.0),)).unwrap())
        .collect();

    let handles: Vec<_> = entities
        .chunks(50)
        .map(|chunk| {
            let world = world.clone();
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                for entity in chunk {
                    world.add_component(entity, Vel(0.0, 1.0)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for entity in &entities {
        assert!(world.has_component::<Vel>(*entity));
    }
}
