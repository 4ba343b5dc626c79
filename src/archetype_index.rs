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

//! The set of all archetypes in a world, plus a generation-invalidated
//! cache of `(with, without)` query results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use tinyvec::TinyVec;

use crate::archetype::{Archetype, ArchetypeCreator, ArchetypeId};
use crate::pool;
use crate::signature::ArchetypeSignature;

/// Query results up to this size are stored inline in the cache entry and
/// returned inline, with no heap allocation.
pub const SMALL_RESULT_THRESHOLD: usize = 8;

pub type MatchList = TinyVec<[ArchetypeId; SMALL_RESULT_THRESHOLD]>;

#[derive(Clone, PartialEq, Eq, Hash)]
struct QueryKey {
    with: ArchetypeSignature,
    without: ArchetypeSignature,
}

struct CacheEntry {
    generation: u64,
    ids: MatchList,
}

#[derive(Default)]
struct Stats {
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

/// Point-in-time snapshot of [`ArchetypeIndex`] cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    pub size: usize,
    pub generation: u64,
}

/// Owns every archetype in a world and answers `(with, without)` queries.
pub struct ArchetypeIndex {
    next_id: AtomicU64,
    archetypes: RwLock<AHashMap<ArchetypeId, Arc<Archetype>>>,
    by_signature: RwLock<AHashMap<ArchetypeSignature, ArchetypeId>>,
    generation: AtomicU64,
    query_cache: RwLock<AHashMap<QueryKey, CacheEntry>>,
    stats: Stats,
    chunk_capacity: usize,
}

impl ArchetypeIndex {
    pub fn new(chunk_capacity: usize) -> Self {
        Self {
            next_id: AtomicU64::new(0),
            archetypes: RwLock::new(AHashMap::default()),
            by_signature: RwLock::new(AHashMap::default()),
            generation: AtomicU64::new(0),
            query_cache: RwLock::new(AHashMap::default()),
            stats: Stats::default(),
            chunk_capacity,
        }
    }

    pub fn get(&self, id: ArchetypeId) -> Arc<Archetype> {
        self.archetypes
            .read()
            .get(&id)
            .cloned()
            .expect("archetype id must have been created through this index")
    }

    pub fn archetype_count(&self) -> usize {
        self.archetypes.read().len()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Every archetype currently in the index, in ascending id order — used
    /// by `clear_one_frame_data` and snapshotting, which both need a
    /// deterministic full sweep.
    pub fn all_sorted(&self) -> Vec<Arc<Archetype>> {
        let archetypes = self.archetypes.read();
        let mut all: Vec<Arc<Archetype>> = archetypes.values().cloned().collect();
        all.sort_by_key(|a| a.id());
        all
    }

    /// Archetypes matching `archetype.signature ⊇ with` and
    /// `archetype.signature ∩ without = ∅`, in deterministic ascending-id
    /// order. Served from cache unless a structural change bumped the
    /// generation counter since the cached entry was built.
    pub fn matching(&self, with: &ArchetypeSignature, without: &ArchetypeSignature) -> MatchList {
        let current_gen = self.generation();
        let key = QueryKey {
            with: with.clone(),
            without: without.clone(),
        };
        if let Some(entry) = self.query_cache.read().get(&key) {
            if entry.generation == current_gen {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return entry.ids.clone();
            }
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);

        let mut scratch = pool::acquire_archetype_ids();
        for archetype in self.all_sorted() {
            if archetype.signature().is_superset_of(with)
                && archetype.signature().intersection_count(without) == 0
            {
                scratch.push(archetype.id());
            }
        }
        let ids: MatchList = scratch.iter().copied().collect();
        pool::release_archetype_ids(scratch);

        self.query_cache.write().insert(
            key,
            CacheEntry {
                generation: current_gen,
                ids: ids.clone(),
            },
        );
        ids
    }

    pub fn cache_stats(&self) -> QueryCacheStats {
        QueryCacheStats {
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            invalidations: self.stats.invalidations.load(Ordering::Relaxed),
            size: self.query_cache.read().len(),
            generation: self.generation(),
        }
    }
}

impl ArchetypeCreator for ArchetypeIndex {
    fn get_or_create_signature(&self, signature: &ArchetypeSignature) -> ArchetypeId {
        if let Some(&id) = self.by_signature.read().get(signature) {
            return id;
        }
        let mut by_signature = self.by_signature.write();
        if let Some(&id) = by_signature.get(signature) {
            return id;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let archetype = Arc::new(Archetype::new(id, signature.clone(), self.chunk_capacity));
        self.archetypes.write().insert(id, archetype);
        by_signature.insert(signature.clone(), id);
        drop(by_signature);
        // Any new archetype can change which archetypes satisfy an existing
        // query, so every cached result is now stale.
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
        id
    }
}
