use chunked_ecs::{EcsConfig, World};
use std::{fs::File, time::Instant};

#[derive(Debug, Clone, Copy)]
struct Position(f32, f32, f32);

#[derive(Debug, Clone, Copy)]
struct Velocity(f32, f32, f32);

#[derive(Debug, Clone, Copy)]
struct Health(u32);

fn main() {
    let file = File::create("trace.json").unwrap();
    let (non_blocking, _guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .init();

    let world = World::new(EcsConfig::default());

    for _ in 0..1000 {
        world
            .spawn((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0)))
            .unwrap();
    }

    let start = Instant::now();
    for _ in 0..10_000 {
        world
            .spawn((Position(1.0, 2.0, 3.0), Velocity(1.0, 0.0, 0.0), Health(100)))
            .unwrap();
    }
    println!("Spawn 10k entities: {:?}", start.elapsed());
}
