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

//! Query builder: `.with::<T>()` / `.without::<T>()` narrow a signature pair,
//! resolved against [`crate::archetype_index::ArchetypeIndex`]'s cache.

use std::sync::Arc;

use crate::archetype::Archetype;
use crate::archetype_index::ArchetypeIndex;
use crate::component::{Component, ComponentTypeRegistry};
use crate::signature::ArchetypeSignature;
use crate::storage::Chunk;

/// Builds a `(with, without)` signature pair and runs it against the owning
/// world's archetype index.
pub struct QueryBuilder<'w> {
    index: &'w ArchetypeIndex,
    with: ArchetypeSignature,
    without: ArchetypeSignature,
}

impl<'w> QueryBuilder<'w> {
    pub(crate) fn new(index: &'w ArchetypeIndex) -> Self {
        Self {
            index,
            with: ArchetypeSignature::empty(),
            without: ArchetypeSignature::empty(),
        }
    }

    /// Require component `T`.
    pub fn with<T: Component>(mut self) -> Self {
        self.with = self.with.add(ComponentTypeRegistry::register::<T>());
        self
    }

    /// Exclude entities that carry component `T`.
    pub fn without<T: Component>(mut self) -> Self {
        self.without = self.without.add(ComponentTypeRegistry::register::<T>());
        self
    }

    fn matching_archetypes(&self) -> Vec<Arc<Archetype>> {
        self.index
            .matching(&self.with, &self.without)
            .iter()
            .map(|&id| self.index.get(id))
            .collect()
    }

    /// Total live entities across every matching archetype.
    pub fn count(&self) -> usize {
        self.matching_archetypes()
            .iter()
            .map(|a| a.entity_count())
            .sum()
    }

    /// Visit every chunk of every matching archetype, in ascending archetype
    /// id order. Each archetype's chunk list is read-locked only for the
    /// duration of its own visit, so `f` never blocks a structural mutation
    /// on a different archetype.
    pub fn for_each_chunk(&self, mut f: impl FnMut(&Chunk)) {
        for archetype in self.matching_archetypes() {
            archetype.for_each_chunk(|chunk| f(chunk));
        }
    }

    /// Number of distinct archetypes this query currently matches.
    pub fn archetype_count(&self) -> usize {
        self.matching_archetypes().len()
    }
}
