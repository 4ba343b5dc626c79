// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deferred world mutations queued by a system during one scheduler level
//! and applied by the executor once that level's systems have all returned.
//!
//! A level's systems may run concurrently (on disjoint component access, by
//! construction — see [`crate::schedule`]), so none of them should
//! structurally mutate the world directly: a despawn or `add_component`
//! migrates rows and can trigger another archetype's swap-remove, which a
//! concurrently-running sibling system might be mid-iteration over. Queuing
//! the mutation here and flushing after the level barrier keeps that
//! ordering explicit instead of relying on `World`'s internal locks to paper
//! over it.

use crate::component::Component;
use crate::entity::EntityId;
use crate::error::Result;
use crate::world::World;

type CommandClosure = Box<dyn FnOnce(&World) -> Result<()> + Send>;

enum Command {
    Despawn(EntityId),
    Mutate(CommandClosure),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Despawn(e) => f.debug_tuple("Despawn").field(e).finish(),
            Command::Mutate(_) => write!(f, "Mutate(...)"),
        }
    }
}

/// Queue of deferred structural mutations. Commands apply in the order they
/// were queued.
#[derive(Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
        }
    }

    pub fn despawn(&mut self, entity: EntityId) {
        self.commands.push(Command::Despawn(entity));
    }

    /// Queue an arbitrary world mutation, e.g. a multi-step spawn.
    pub fn add<F>(&mut self, f: F)
    where
        F: FnOnce(&World) -> Result<()> + Send + 'static,
    {
        self.commands.push(Command::Mutate(Box::new(f)));
    }

    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) {
        self.add(move |world| world.add_component(entity, component));
    }

    pub fn remove_component<T: Component>(&mut self, entity: EntityId) {
        self.add(move |world| world.remove_component::<T>(entity));
    }

    /// Apply every queued command to `world`, in order, then clear the
    /// buffer. The first command to fail stops the flush; commands queued
    /// after it are dropped unapplied and the error is returned.
    pub fn apply(&mut self, world: &World) -> Result<()> {
        for command in self.commands.drain(..) {
            match command {
                Command::Despawn(entity) => world.despawn(entity)?,
                Command::Mutate(f) => f(world)?,
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EcsConfig;

    #[derive(Clone, Copy)]
    struct Marker;

    #[test]
    fn queued_despawn_is_visible_only_after_apply() {
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Marker,)).unwrap();
        let mut buffer = CommandBuffer::new();
        buffer.despawn(e);
        assert!(world.is_alive(e));
        buffer.apply(&world).unwrap();
        assert!(!world.is_alive(e));
    }

    #[test]
    fn clear_drops_unapplied_commands() {
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Marker,)).unwrap();
        let mut buffer = CommandBuffer::new();
        buffer.despawn(e);
        buffer.clear();
        buffer.apply(&world).unwrap();
        assert!(world.is_alive(e));
    }

    #[test]
    fn add_component_command_applies_on_flush() {
        #[derive(Clone, Copy, PartialEq, Debug)]
        struct Health(i32);
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Marker,)).unwrap();
        let mut buffer = CommandBuffer::new();
        buffer.add_component(e, Health(10));
        assert!(!world.has_component::<Health>(e));
        buffer.apply(&world).unwrap();
        assert_eq!(*world.get_component::<Health>(e).unwrap(), Health(10));
    }
}
