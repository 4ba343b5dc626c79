//! Parallel scheduler usage: register a few systems with declared read/write
//! access, let conflict detection order them, and run one tick.

use chunked_ecs::{
    CommandBuffer, ComponentTypeId, EcsConfig, Result, Schedule, System, SystemAccess,
    SystemScheduler, World,
};

#[derive(Debug, Clone, Copy)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy)]
struct Velocity {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy)]
struct Health {
    current: i32,
    max: i32,
}

struct MovementSystem;

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "movement_system"
    }

    fn access(&self) -> SystemAccess {
        SystemAccess {
            reads: vec![ComponentTypeId(0)],
            writes: vec![ComponentTypeId(1)],
        }
    }

    fn run(&mut self, _world: &World, _commands: &mut CommandBuffer) -> Result<()> {
        println!("Running movement system");
        Ok(())
    }
}

struct HealthSystem;

impl System for HealthSystem {
    fn name(&self) -> &'static str {
        "health_system"
    }

    fn access(&self) -> SystemAccess {
        SystemAccess {
            reads: vec![ComponentTypeId(2)],
            writes: vec![],
        }
    }

    fn run(&mut self, _world: &World, _commands: &mut CommandBuffer) -> Result<()> {
        println!("Running health system");
        Ok(())
    }
}

struct RenderSystem;

impl System for RenderSystem {
    fn name(&self) -> &'static str {
        "render_system"
    }

    fn access(&self) -> SystemAccess {
        SystemAccess {
            reads: vec![ComponentTypeId(0), ComponentTypeId(1)],
            writes: vec![],
        }
    }

    fn run(&mut self, _world: &World, _commands: &mut CommandBuffer) -> Result<()> {
        println!("Running render system");
        Ok(())
    }
}

fn main() -> Result<()> {
    println!("=== chunked_ecs: parallel scheduler demo ===\n");

    let world = World::new(EcsConfig::default());

    let entity1 = world.spawn((
        Position { x: 0.0, y: 0.0 },
        Velocity { x: 1.0, y: 0.5 },
        Health {
            current: 100,
            max: 100,
        },
    ))?;

    let entity2 = world.spawn((
        Position { x: 10.0, y: 5.0 },
        Velocity { x: -0.5, y: 1.0 },
        Health {
            current: 75,
            max: 100,
        },
    ))?;

    println!("Spawned entities: {:?}, {:?}\n", entity1, entity2);

    let mut scheduler = SystemScheduler::new(Schedule::new());
    scheduler.add_system(Box::new(MovementSystem));
    scheduler.add_system(Box::new(HealthSystem));
    scheduler.add_system(Box::new(RenderSystem));

    println!("Executing 3 ticks:\n");
    for tick in 0..3 {
        println!("Tick {}", tick);
        scheduler.run(&world)?;
        println!();
    }

    println!("=== Demo complete ===");
    Ok(())
}
