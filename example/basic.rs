//! Basic usage: spawn entities into different archetypes, inspect and
//! despawn them, all through the public `World` API.

use chunked_ecs::{EcsConfig, World};

#[allow(dead_code)]
#[derive(Debug)]
struct Position {
    x: f32,
    y: f32,
}

#[allow(dead_code)]
#[derive(Debug)]
struct Velocity {
    x: f32,
    y: f32,
}

#[allow(dead_code)]
#[derive(Debug)]
struct Health(u32);

fn main() {
    let world = World::new(EcsConfig::default());

    println!("Creating entities...");

    let entity1 = world
        .spawn((Position { x: 0.0, y: 0.0 }, Velocity { x: 1.0, y: 0.5 }))
        .expect("spawn entity1");
    println!("Spawned entity {:?}", entity1);

    let entity2 = world
        .spawn((
            Position { x: 10.0, y: 20.0 },
            Velocity { x: -1.0, y: 2.0 },
            Health(100),
        ))
        .expect("spawn entity2");
    println!("Spawned entity {:?}", entity2);

    let entity3 = world
        .spawn((Position { x: 5.0, y: 5.0 },))
        .expect("spawn entity3");
    println!("Spawned entity {:?}", entity3);

    if let Ok(pos) = world.get_component::<Position>(entity1) {
        println!("Entity {:?} is at ({}, {})", entity1, pos.x, pos.y);
    }

    world.despawn(entity2).expect("despawn entity2");
    println!("Despawned entity {:?}", entity2);

    if !world.is_alive(entity2) {
        println!("Entity {:?} no longer exists", entity2);
    }

    println!(
        "\n{} entities across {} archetypes",
        world.entity_count(),
        world.archetype_count()
    );
}
