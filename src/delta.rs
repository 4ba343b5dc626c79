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

//! Cached column-copy plans for migrating a row between two archetypes.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::archetype::{Archetype, ArchetypeId};
use crate::component::ComponentTypeRegistry;

/// One `(src_column, dst_column, element_size)` copy instruction.
pub type ColumnCopy = (usize, usize, usize);

/// The set of column copies needed to move a row from one archetype to
/// another, covering the intersection of their component sets.
pub struct DeltaPlan {
    pub copies: Vec<ColumnCopy>,
}

impl DeltaPlan {
    pub fn build(src: &Archetype, dst: &Archetype) -> Self {
        let mut copies = Vec::new();
        for (src_col, &component_id) in src.component_order().iter().enumerate() {
            if let Some(dst_col) = dst.column_index_of(component_id) {
                let size = ComponentTypeRegistry::info_of(component_id).size;
                copies.push((src_col, dst_col, size));
            }
        }
        Self { copies }
    }
}

/// Caches [`DeltaPlan`]s keyed by `(src_archetype_id, dst_archetype_id)`.
/// Built once per ordered pair; reads after that are lock-free in the
/// common case of an uncontended `RwLock` read.
pub struct DeltaCache {
    plans: RwLock<AHashMap<(ArchetypeId, ArchetypeId), Arc<DeltaPlan>>>,
}

impl DeltaCache {
    pub fn new() -> Self {
        Self {
            plans: RwLock::new(AHashMap::default()),
        }
    }

    pub fn get_or_build(&self, src: &Archetype, dst: &Archetype) -> Arc<DeltaPlan> {
        let key = (src.id(), dst.id());
        if let Some(plan) = self.plans.read().get(&key) {
            return plan.clone();
        }
        let mut plans = self.plans.write();
        if let Some(plan) = plans.get(&key) {
            return plan.clone();
        }
        let plan = Arc::new(DeltaPlan::build(src, dst));
        plans.insert(key, plan.clone());
        plan
    }
}

impl Default for DeltaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ArchetypeSignature;

    #[derive(Clone, Copy)]
    struct A;
    #[derive(Clone, Copy)]
    struct B;

    #[test]
    fn plan_covers_shared_columns_only() {
        let id_a = ComponentTypeRegistry::register::<A>();
        let id_b = ComponentTypeRegistry::register::<B>();
        let src = Archetype::new(0, ArchetypeSignature::empty().add(id_a), 512);
        let dst = Archetype::new(1, ArchetypeSignature::empty().add(id_a).add(id_b), 512);
        let plan = DeltaPlan::build(&src, &dst);
        assert_eq!(plan.copies.len(), 1);
    }

    #[test]
    fn cache_reuses_plan_for_same_pair() {
        let id_a = ComponentTypeRegistry::register::<A>();
        let src = Archetype::new(0, ArchetypeSignature::empty(), 512);
        let dst = Archetype::new(1, ArchetypeSignature::empty().add(id_a), 512);
        let cache = DeltaCache::new();
        let p1 = cache.get_or_build(&src, &dst);
        let p2 = cache.get_or_build(&src, &dst);
        assert!(Arc::ptr_eq(&p1, &p2));
    }
}
