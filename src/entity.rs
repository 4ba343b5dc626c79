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

//! Entity identifiers and the registry that allocates/recycles them.
//!
//! An [`EntityId`] is a packed `(index, generation)` pair. `index` is stable
//! for the lifetime of a slot; `generation` is bumped every time the slot is
//! recycled so stale handles can be detected in O(1).

use std::fmt;

/// Packed 64-bit entity identifier: `index` in the low 32 bits, `generation`
/// in the high 32 bits. Packing/unpacking is bitshift-only so the
/// representation is endian-neutral. `(0, 0)` is the reserved invalid
/// sentinel — `index` is non-zero for every entity actually handed out by
/// [`EntityRegistry::create`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// The reserved invalid sentinel, equal to `(index: 0, generation: 0)`.
    pub const INVALID: EntityId = EntityId(0);

    #[inline]
    pub const fn from_parts(index: u32, generation: u32) -> Self {
        EntityId(((generation as u64) << 32) | index as u64)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    #[inline]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    #[inline]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        EntityId(bits)
    }

    #[inline]
    pub const fn is_invalid(self) -> bool {
        self.index() == 0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        EntityId::INVALID
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}, gen {})", self.index(), self.generation())
    }
}

/// Per-slot bookkeeping for the registry's free list.
#[derive(Clone, Copy)]
struct Slot {
    generation: u32,
    alive: bool,
}

/// Entity location in archetype storage: which archetype, which chunk,
/// which row within that chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityLocation {
    pub archetype_id: u64,
    pub chunk_index: u32,
    pub row_index: u32,
}

/// Allocates and recycles [`EntityId`]s.
///
/// Slot 0 is never handed out (it backs the `(0, 0)` invalid sentinel).
/// Freed indices are recycled LIFO, which makes the id stream produced by a
/// fixed sequence of create/destroy calls byte-identical across runs and
/// across processes (spec §4.1 / §8).
pub struct EntityRegistry {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            // index 0 is the permanently-dead placeholder slot for the sentinel.
            slots: vec![Slot {
                generation: 0,
                alive: false,
            }],
            free_list: Vec::new(),
        }
    }

    /// Allocate a fresh, live entity id. Never returns `(0, _)`.
    pub fn create(&mut self) -> EntityId {
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.alive = true;
            EntityId::from_parts(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 1,
                alive: true,
            });
            EntityId::from_parts(index, 1)
        }
    }

    /// Destroy an entity. Silent no-op for `(0, _)`, an already-dead id, or a
    /// stale (generation mismatch) id.
    pub fn destroy(&mut self, id: EntityId) {
        if id.is_invalid() {
            return;
        }
        let index = id.index() as usize;
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if !slot.alive || slot.generation != id.generation() {
            return;
        }
        slot.alive = false;
        self.free_list.push(index as u32);
    }

    /// O(1) liveness check.
    pub fn is_alive(&self, id: EntityId) -> bool {
        if id.is_invalid() {
            return false;
        }
        match self.slots.get(id.index() as usize) {
            Some(slot) => slot.alive && slot.generation == id.generation(),
            None => false,
        }
    }

    /// Number of currently-live entities.
    pub fn live_count(&self) -> usize {
        self.slots.len() - 1 - self.free_list.len()
    }

    /// Number of indices available for immediate reuse.
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Every currently-live entity, ascending by index. Slot 0 (the invalid
    /// sentinel) is never live, so it never appears.
    pub fn iter_live(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(index, slot)| EntityId::from_parts(index as u32, slot.generation))
    }

    /// Mark the exact slot backing `id` alive with `id`'s own generation,
    /// growing the slot table as needed. Used by snapshot restore, which
    /// must reproduce the saved id stream exactly rather than hand out
    /// fresh ids — indices that were free at save time are simply left
    /// unrecycled rather than reconstructing the free list.
    pub fn restore(&mut self, id: EntityId) {
        let index = id.index() as usize;
        while self.slots.len() <= index {
            self.slots.push(Slot {
                generation: 0,
                alive: false,
            });
        }
        self.slots[index] = Slot {
            generation: id.generation(),
            alive: true,
        };
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_entity_is_index_one_generation_one() {
        let mut reg = EntityRegistry::new();
        let e1 = reg.create();
        assert_eq!(e1.index(), 1);
        assert_eq!(e1.generation(), 1);
    }

    #[test]
    fn recycling_bumps_generation_and_reuses_index() {
        let mut reg = EntityRegistry::new();
        let e1 = reg.create();
        reg.destroy(e1);
        let e2 = reg.create();
        assert_eq!(e2.index(), 1);
        assert_eq!(e2.generation(), 2);
        assert!(!reg.is_alive(e1));
        assert!(reg.is_alive(e2));
    }

    #[test]
    fn destroy_is_silent_on_invalid_dead_and_stale() {
        let mut reg = EntityRegistry::new();
        reg.destroy(EntityId::INVALID); // never created
        let e1 = reg.create();
        reg.destroy(e1);
        reg.destroy(e1); // already dead
        let e2 = reg.create();
        reg.destroy(EntityId::from_parts(
            e2.index(),
            e2.generation().wrapping_sub(1),
        )); // stale
        assert!(reg.is_alive(e2));
    }

    #[test]
    fn free_list_is_lifo_deterministic() {
        let mut reg = EntityRegistry::new();
        let a = reg.create();
        let b = reg.create();
        let c = reg.create();
        reg.destroy(a);
        reg.destroy(b);
        reg.destroy(c);
        // LIFO: c's index recycled first, then b's, then a's.
        let r1 = reg.create();
        let r2 = reg.create();
        let r3 = reg.create();
        assert_eq!(r1.index(), c.index());
        assert_eq!(r2.index(), b.index());
        assert_eq!(r3.index(), a.index());
    }

    #[test]
    fn identical_call_sequences_produce_identical_id_streams() {
        let run = || {
            let mut reg = EntityRegistry::new();
            let a = reg.create();
            let b = reg.create();
            reg.destroy(a);
            let c = reg.create();
            (a, b, c)
        };
        assert!(run() == run());
    }

    #[test]
    fn iter_live_is_ascending_by_index_and_skips_dead_slots() {
        let mut reg = EntityRegistry::new();
        let a = reg.create();
        let b = reg.create();
        let c = reg.create();
        reg.destroy(b);

        let live: Vec<EntityId> = reg.iter_live().collect();
        assert_eq!(live, vec![a, c]);
    }
}
