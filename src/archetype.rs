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

//! Archetypes: one per distinct component signature, owning an ordered
//! chunk list and a cache of add/remove edges to neighboring archetypes.

use ahash::AHashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::component::{ComponentInfo, ComponentTypeId, ComponentTypeRegistry};
use crate::entity::EntityId;
use crate::signature::ArchetypeSignature;
use crate::storage::Chunk;

pub type ArchetypeId = u64;

/// Cached neighbor reached by adding or removing one component type.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArchetypeEdge {
    pub add_target: Option<ArchetypeId>,
    pub remove_target: Option<ArchetypeId>,
}

/// Which direction of an edge is being resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeAction {
    Add,
    Remove,
}

/// Resolves a signature to its canonical archetype id, creating one if
/// needed. Implemented by [`crate::archetype_index::ArchetypeIndex`];
/// archetypes depend on this trait rather than the concrete index type so
/// edge resolution doesn't need a cyclic module dependency.
pub trait ArchetypeCreator {
    fn get_or_create_signature(&self, signature: &ArchetypeSignature) -> ArchetypeId;
}

fn access_tier(id: ComponentTypeId, max_count: u64) -> u8 {
    if max_count == 0 {
        return 0;
    }
    let count = ComponentTypeRegistry::access_count(id);
    let ratio = count as f64 / max_count as f64;
    if ratio > 0.66 {
        2
    } else if ratio > 0.33 {
        1
    } else {
        0
    }
}

/// Order component types by descending access-frequency tier, then
/// ascending size, so hot, small columns sit earliest — this affects only
/// column index, never external addressing by [`ComponentTypeId`].
fn order_components(signature: &ArchetypeSignature) -> (Vec<ComponentTypeId>, Vec<ComponentInfo>) {
    let ids: Vec<ComponentTypeId> = signature.ids().collect();
    let max_count = ids
        .iter()
        .map(|&id| ComponentTypeRegistry::access_count(id))
        .max()
        .unwrap_or(0);
    let mut ordered: Vec<(ComponentTypeId, ComponentInfo)> = ids
        .into_iter()
        .map(|id| (id, ComponentTypeRegistry::info_of(id)))
        .collect();
    ordered.sort_by_key(|(id, info)| (std::cmp::Reverse(access_tier(*id, max_count)), info.size));
    let ids = ordered.iter().map(|(id, _)| *id).collect();
    let infos = ordered.iter().map(|(_, info)| *info).collect();
    (ids, infos)
}

/// One archetype: a signature, its ordered component columns, its chunk
/// list, and its edge cache.
pub struct Archetype {
    id: ArchetypeId,
    signature: ArchetypeSignature,
    component_order: Vec<ComponentTypeId>,
    column_of: AHashMap<ComponentTypeId, usize>,
    component_infos: Vec<ComponentInfo>,
    chunk_capacity: usize,
    chunks: RwLock<Vec<Chunk>>,
    edges: RwLock<AHashMap<ComponentTypeId, ArchetypeEdge>>,
}

impl Archetype {
    pub fn new(id: ArchetypeId, signature: ArchetypeSignature, chunk_capacity: usize) -> Self {
        let (component_order, component_infos) = order_components(&signature);
        let column_of = component_order
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        Self {
            id,
            signature,
            component_order,
            column_of,
            component_infos,
            chunk_capacity,
            chunks: RwLock::new(Vec::new()),
            edges: RwLock::new(AHashMap::default()),
        }
    }

    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    pub fn signature(&self) -> &ArchetypeSignature {
        &self.signature
    }

    pub fn has_component(&self, id: ComponentTypeId) -> bool {
        self.signature.has(id)
    }

    pub fn column_index_of(&self, id: ComponentTypeId) -> Option<usize> {
        self.column_of.get(&id).copied()
    }

    pub fn component_order(&self) -> &[ComponentTypeId] {
        &self.component_order
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn chunk_row_count(&self, chunk_index: usize) -> usize {
        self.chunks.read()[chunk_index].count()
    }

    pub fn entity_count(&self) -> usize {
        self.chunks.read().iter().map(Chunk::count).sum()
    }

    pub fn get_entity(&self, chunk_index: usize, row: usize) -> EntityId {
        self.chunks.read()[chunk_index].get_entity(row)
    }

    /// Insert a new row, filling every column via `value_ptr_for(component)`.
    /// Holds this archetype's structural write lock for the duration, per
    /// the spec's "structural mutation of a given archetype serializes on
    /// that archetype's write lock" rule.
    pub fn insert_entity(
        &self,
        entity: EntityId,
        mut value_ptr_for: impl FnMut(ComponentTypeId) -> *const u8,
    ) -> (usize, usize) {
        let mut chunks = self.chunks.write();
        if chunks.is_empty() || chunks.last().expect("non-empty").is_full() {
            chunks.push(Chunk::new(self.chunk_capacity, &self.component_infos));
        }
        let chunk_index = chunks.len() - 1;
        let chunk = &mut chunks[chunk_index];
        let row = chunk.add_row(entity);
        for (col_idx, &component_id) in self.component_order.iter().enumerate() {
            let ptr = value_ptr_for(component_id);
            // SAFETY: column `col_idx` was created for `component_id`'s
            // layout and `ptr` points at a value of that same type.
            unsafe {
                chunk.column_mut(col_idx).push_raw(ptr);
            }
        }
        (chunk_index, row)
    }

    /// Remove a row via swap-remove. Returns the id of whichever entity was
    /// moved into `(chunk_index, row)`, if any, so the caller can update its
    /// entity record.
    pub fn remove_row(&self, chunk_index: usize, row: usize) -> Option<EntityId> {
        let mut chunks = self.chunks.write();
        chunks[chunk_index].swap_remove(row)
    }

    /// Like [`Self::remove_row`], but columns in `skip_columns` are removed
    /// without running drop glue, because a structural migration already
    /// relocated those values into the destination archetype's row.
    pub fn remove_row_skip(
        &self,
        chunk_index: usize,
        row: usize,
        skip_columns: &[usize],
    ) -> Option<EntityId> {
        let mut chunks = self.chunks.write();
        chunks[chunk_index].swap_remove_skip(row, skip_columns)
    }

    /// Read-lock the chunk list directly, for callers that need a guard
    /// (e.g. `World::get_component`, which maps the guard down to a single
    /// component reference via `parking_lot`'s mapped guards).
    pub fn chunks_read(&self) -> RwLockReadGuard<'_, Vec<Chunk>> {
        self.chunks.read()
    }

    pub fn chunks_write(&self) -> RwLockWriteGuard<'_, Vec<Chunk>> {
        self.chunks.write()
    }

    /// Run `f` over every chunk, read-only, without holding the lock across
    /// calls into `f` longer than necessary for iteration.
    pub fn for_each_chunk(&self, mut f: impl FnMut(&Chunk)) {
        let chunks = self.chunks.read();
        for chunk in chunks.iter() {
            f(chunk);
        }
    }

    pub fn with_chunk_mut<R>(&self, chunk_index: usize, f: impl FnOnce(&mut Chunk) -> R) -> R {
        let mut chunks = self.chunks.write();
        f(&mut chunks[chunk_index])
    }

    /// Resolve (creating if necessary) the neighbor reached by adding or
    /// removing `component`. Concurrent callers racing on the same edge
    /// converge on one target because `creator.get_or_create_signature` is
    /// itself idempotent per signature.
    pub fn get_or_create_edge(
        &self,
        action: EdgeAction,
        component: ComponentTypeId,
        creator: &dyn ArchetypeCreator,
    ) -> ArchetypeId {
        {
            let edges = self.edges.read();
            if let Some(edge) = edges.get(&component) {
                let cached = match action {
                    EdgeAction::Add => edge.add_target,
                    EdgeAction::Remove => edge.remove_target,
                };
                if let Some(target) = cached {
                    return target;
                }
            }
        }
        let target_signature = match action {
            EdgeAction::Add => self.signature.add(component),
            EdgeAction::Remove => self.signature.remove(component),
        };
        let target_id = creator.get_or_create_signature(&target_signature);
        let mut edges = self.edges.write();
        let entry = edges.entry(component).or_default();
        match action {
            EdgeAction::Add => {
                entry.add_target.get_or_insert(target_id);
            }
            EdgeAction::Remove => {
                entry.remove_target.get_or_insert(target_id);
            }
        }
        target_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubCreator(ArchetypeId);
    impl ArchetypeCreator for StubCreator {
        fn get_or_create_signature(&self, _signature: &ArchetypeSignature) -> ArchetypeId {
            self.0
        }
    }

    #[derive(Clone, Copy)]
    struct Position {
        #[allow(dead_code)]
        x: f32,
    }

    #[test]
    fn insert_and_remove_row() {
        let id = ComponentTypeRegistry::register::<Position>();
        let sig = ArchetypeSignature::empty().add(id);
        let archetype = Archetype::new(1, sig, 4);
        let e0 = EntityId::from_parts(1, 1);
        let value = Position { x: 7.0 };
        let (chunk_idx, row) =
            archetype.insert_entity(e0, |_| &value as *const Position as *const u8);
        assert_eq!((chunk_idx, row), (0, 0));
        assert_eq!(archetype.entity_count(), 1);
        let moved = archetype.remove_row(chunk_idx, row);
        assert_eq!(moved, None);
        assert_eq!(archetype.entity_count(), 0);
    }

    #[test]
    fn edge_cache_resolves_once() {
        let id = ComponentTypeRegistry::register::<Position>();
        let archetype = Archetype::new(0, ArchetypeSignature::empty(), 4);
        let creator = StubCreator(42);
        let first = archetype.get_or_create_edge(EdgeAction::Add, id, &creator);
        let second = archetype.get_or_create_edge(EdgeAction::Add, id, &creator);
        assert_eq!(first, 42);
        assert_eq!(second, 42);
    }
}
