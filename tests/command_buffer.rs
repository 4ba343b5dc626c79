use chunked_ecs::{CommandBuffer, EcsConfig, World};

#[derive(Debug, Clone, Copy, PartialEq)]
struct A(i32);
#[derive(Debug, Clone, Copy, PartialEq)]
struct B(i32);

#[test]
fn despawn_is_deferred_until_apply() {
    let world = World::new(EcsConfig::default());
    let e = world.spawn((A(1),)).unwrap();

    let mut commands = CommandBuffer::new();
    commands.despawn(e);
    assert!(world.is_alive(e), "despawn must not take effect before apply");

    commands.apply(&world).unwrap();
    assert!(!world.is_alive(e));
}

#[test]
fn add_component_is_deferred_until_apply() {
    let world = World::new(EcsConfig::default());
    let e = world.spawn((A(1),)).unwrap();

    let mut commands = CommandBuffer::new();
    commands.add_component(e, B(2));
    assert!(!world.has_component::<B>(e));

    commands.apply(&world).unwrap();
    assert!(world.has_component::<B>(e));
}

#[test]
fn arbitrary_mutation_via_add_can_spawn_new_entities() {
    let world = World::new(EcsConfig::default());

    let mut commands = CommandBuffer::new();
    commands.add(|world| {
        world.spawn((A(1), B(2)))?;
        Ok(())
    });
    assert_eq!(world.entity_count(), 0);

    commands.apply(&world).unwrap();
    assert_eq!(world.entity_count(), 1);
}

#[test]
fn a_failing_command_stops_the_flush_and_drops_the_rest() {
    let world = World::new(EcsConfig::default());
    let e = world.spawn((A(1),)).unwrap();
    world.despawn(e).unwrap();
    let other = world.spawn((A(2),)).unwrap();

    let mut commands = CommandBuffer::new();
    commands.add_component(e, B(2)); // entity is dead: errors
    commands.add_component(other, B(3));

    assert!(commands.apply(&world).is_err());
    assert!(
        !world.has_component::<B>(other),
        "a command queued after a failing one must not apply"
    );
}

#[test]
fn apply_clears_the_buffer() {
    let world = World::new(EcsConfig::default());
    let e = world.spawn((A(1),)).unwrap();
    let mut commands = CommandBuffer::new();
    commands.despawn(e);
    commands.apply(&world).unwrap();
    assert!(commands.is_empty());
}
