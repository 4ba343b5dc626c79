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

//! [`World`]: the entry point tying entity allocation, archetype storage,
//! and structural migration together.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;
use bumpalo::Bump;
use parking_lot::{
    MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

use crate::archetype::{Archetype, ArchetypeCreator, EdgeAction};
use crate::archetype_index::{ArchetypeIndex, QueryCacheStats};
use crate::component::{Bundle, Component, ComponentTypeId, ComponentTypeRegistry};
use crate::config::EcsConfig;
use crate::delta::DeltaCache;
use crate::entity::{EntityId, EntityLocation, EntityRegistry};
use crate::error::{EcsError, Result};
use crate::event_channel::EventChannelRegistry;
use crate::logging::{current_correlation_id, EcsOperation, LogEvent, LogLevel, LogSink, NullLogSink};
use crate::metrics::{MetricsSink, NullMetricsSink};
use crate::query::QueryBuilder;
use crate::signature::ArchetypeSignature;

/// A read-only reference to one entity's component, borrowed from its
/// archetype's chunk storage.
///
/// Bundles the owning [`Archetype`]'s `Arc` alongside the mapped lock guard
/// so the guard's borrow stays valid for as long as the reference is held,
/// without pinning the caller's stack frame the way a borrowed `&Archetype`
/// would.
pub struct ComponentRef<T: Component> {
    // Declared before `archetype` so it drops first — see the safety note in
    // `ComponentRef::new`.
    guard: MappedRwLockReadGuard<'static, T>,
    archetype: Arc<Archetype>,
}

impl<T: Component> ComponentRef<T> {
    fn new(archetype: Arc<Archetype>, chunk_index: usize, row: usize, column: usize) -> Self {
        let guard = archetype.chunks_read();
        let mapped = RwLockReadGuard::map(guard, |chunks| {
            // SAFETY: `column` was resolved from this exact archetype's
            // signature for component type `T`.
            let slice = unsafe { chunks[chunk_index].column(column).get_slice::<T>() };
            &slice[row]
        });
        // SAFETY: `mapped` borrows from `archetype`'s internal `RwLock`,
        // which lives on the heap behind the `Arc` stored in this struct.
        // Rust drops struct fields in declaration order, so `guard` is
        // released before `archetype`, and the `Arc` keeps the lock's
        // allocation alive for as long as any clone of it — including this
        // one — exists.
        let mapped: MappedRwLockReadGuard<'static, T> = unsafe { std::mem::transmute(mapped) };
        Self {
            guard: mapped,
            archetype,
        }
    }
}

impl<T: Component> Deref for ComponentRef<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

/// Mutable counterpart to [`ComponentRef`]. Construction marks the touched
/// row dirty before the guard is handed out, so the dirty flag is set even
/// if the caller never writes through the reference.
pub struct ComponentRefMut<T: Component> {
    guard: MappedRwLockWriteGuard<'static, T>,
    archetype: Arc<Archetype>,
}

impl<T: Component> ComponentRefMut<T> {
    fn new(archetype: Arc<Archetype>, chunk_index: usize, row: usize, column: usize) -> Self {
        let mut guard = archetype.chunks_write();
        guard[chunk_index].column_mut(column).mark_row_dirty(row);
        let mapped = RwLockWriteGuard::map(guard, |chunks| {
            // SAFETY: see `ComponentRef::new`.
            unsafe { chunks[chunk_index].column_mut(column).get_mut::<T>(row) }
        });
        // SAFETY: see `ComponentRef::new`.
        let mapped: MappedRwLockWriteGuard<'static, T> = unsafe { std::mem::transmute(mapped) };
        Self {
            guard: mapped,
            archetype,
        }
    }
}

impl<T: Component> Deref for ComponentRefMut<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T: Component> DerefMut for ComponentRefMut<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// Owns every entity, archetype, and event channel in one simulation.
///
/// Structural mutation (spawn, despawn, add/remove component) serializes per
/// archetype on that archetype's own chunk lock; it never takes a single
/// world-wide write lock, so unrelated archetypes stay concurrently
/// accessible. The `records` map (entity id -> storage location) is the one
/// piece of truly global mutable state, and is held only for the duration
/// of a single lookup or update.
pub struct World {
    entities: RwLock<EntityRegistry>,
    records: RwLock<AHashMap<EntityId, EntityLocation>>,
    index: ArchetypeIndex,
    deltas: DeltaCache,
    events: EventChannelRegistry,
    config: EcsConfig,
    log: Box<dyn LogSink>,
    metrics: Box<dyn MetricsSink>,
    tick: AtomicU64,
    disposed: AtomicBool,
}

impl World {
    pub fn new(config: EcsConfig) -> Self {
        Self::with_sinks(config, Box::new(NullLogSink), Box::new(NullMetricsSink))
    }

    pub fn with_sinks(
        config: EcsConfig,
        log: Box<dyn LogSink>,
        metrics: Box<dyn MetricsSink>,
    ) -> Self {
        Self {
            entities: RwLock::new(EntityRegistry::new()),
            records: RwLock::new(AHashMap::default()),
            index: ArchetypeIndex::new(config.chunk_capacity),
            deltas: DeltaCache::new(),
            events: EventChannelRegistry::new(),
            config,
            log,
            metrics,
            tick: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.disposed.load(Ordering::Acquire) {
            Err(EcsError::Disposed)
        } else {
            Ok(())
        }
    }

    fn log(&self, level: LogLevel, operation: EcsOperation, entity: Option<EntityId>, message: &'static str) {
        self.log.log(LogEvent {
            level,
            operation,
            entity,
            component_type_name: None,
            correlation_id: current_correlation_id(),
            message,
        });
    }

    /// Warn once an archetype count crosses the configured soft cap. `0`
    /// disables the check.
    fn check_archetype_cap(&self) {
        let max = self.config.max_archetypes;
        if max != 0 && self.index.archetype_count() == max + 1 {
            self.log(
                LogLevel::Warn,
                EcsOperation::ArchetypeTransition,
                None,
                "archetype count exceeded configured soft cap",
            );
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.tick.load(Ordering::Relaxed)
    }

    pub fn advance_tick(&self) -> u64 {
        self.tick.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn entity_count(&self) -> usize {
        self.entities.read().live_count()
    }

    pub fn archetype_count(&self) -> usize {
        self.index.archetype_count()
    }

    pub fn cache_stats(&self) -> QueryCacheStats {
        self.index.cache_stats()
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.read().is_alive(entity)
    }

    /// Spawn a new entity with every component in `bundle`. All of the
    /// bundle's values are staged in a scratch arena and bytewise-copied
    /// into the destination archetype's columns in a single structural
    /// mutation, so a partially-constructed entity is never observable.
    pub fn spawn<B: Bundle>(&self, bundle: B) -> Result<EntityId> {
        self.ensure_not_disposed()?;
        let start = Instant::now();
        let ids = B::component_type_ids();
        let sizes = B::component_sizes();
        let signature = ArchetypeSignature::from_ids(&ids);
        let archetype_id = self.index.get_or_create_signature(&signature);
        self.check_archetype_cap();
        let archetype = self.index.get(archetype_id);

        let arena = Bump::new();
        let mut ptr_of: AHashMap<ComponentTypeId, *mut u8> = AHashMap::default();
        for (i, &component_id) in ids.iter().enumerate() {
            let info = ComponentTypeRegistry::info_of(component_id);
            let layout = std::alloc::Layout::from_size_align(sizes[i], info.align.max(1))
                .expect("component layout");
            let ptr = if sizes[i] == 0 {
                std::ptr::NonNull::dangling().as_ptr()
            } else {
                arena.alloc_layout(layout).as_ptr()
            };
            ptr_of.insert(component_id, ptr);
        }
        let ptrs: Vec<*mut u8> = ids.iter().map(|id| ptr_of[id]).collect();
        // SAFETY: `ptrs[i]` was allocated above with the layout of the i-th
        // tuple element, matching `write_components`'s contract.
        unsafe { bundle.write_components(&ptrs) };

        let entity = self.entities.write().create();
        let (chunk_index, row) = archetype.insert_entity(entity, |component_id| {
            ptr_of[&component_id] as *const u8
        });
        self.records.write().insert(
            entity,
            EntityLocation {
                archetype_id,
                chunk_index: chunk_index as u32,
                row_index: row as u32,
            },
        );
        for &id in &ids {
            ComponentTypeRegistry::record_access(id);
        }
        self.log(LogLevel::Trace, EcsOperation::EntityCreate, Some(entity), "entity spawned");
        self.metrics.record_operation("spawn", start.elapsed());
        Ok(entity)
    }

    /// Spawn an entity with no components.
    pub fn create_entity(&self) -> Result<EntityId> {
        self.spawn(())
    }

    /// Destroy `entity`. Silent no-op if it is already dead or was never
    /// created, matching [`EntityRegistry::destroy`].
    pub fn despawn(&self, entity: EntityId) -> Result<()> {
        self.ensure_not_disposed()?;
        let record = self.records.write().remove(&entity);
        let Some(record) = record else {
            return Ok(());
        };
        self.entities.write().destroy(entity);
        let archetype = self.index.get(record.archetype_id);
        if let Some(moved_entity) =
            archetype.remove_row(record.chunk_index as usize, record.row_index as usize)
        {
            if let Some(loc) = self.records.write().get_mut(&moved_entity) {
                loc.chunk_index = record.chunk_index;
                loc.row_index = record.row_index;
            }
        }
        self.log(LogLevel::Trace, EcsOperation::EntityDestroy, Some(entity), "entity despawned");
        Ok(())
    }

    /// Alias kept for call sites that prefer the registry's own terminology.
    pub fn destroy_entity(&self, entity: EntityId) -> Result<()> {
        self.despawn(entity)
    }

    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        let id = ComponentTypeRegistry::register::<T>();
        let Some(record) = self.records.read().get(&entity).copied() else {
            return false;
        };
        self.index.get(record.archetype_id).has_component(id)
    }

    pub fn get_component<T: Component>(&self, entity: EntityId) -> Result<ComponentRef<T>> {
        self.ensure_not_disposed()?;
        let id = ComponentTypeRegistry::register::<T>();
        let record = self
            .records
            .read()
            .get(&entity)
            .copied()
            .ok_or(EcsError::EntityNotFound)?;
        let archetype = self.index.get(record.archetype_id);
        let column = archetype
            .column_index_of(id)
            .ok_or(EcsError::ComponentMissing)?;
        ComponentTypeRegistry::record_access(id);
        self.log(LogLevel::Trace, EcsOperation::ComponentGet, Some(entity), "component read");
        Ok(ComponentRef::new(
            archetype,
            record.chunk_index as usize,
            record.row_index as usize,
            column,
        ))
    }

    pub fn get_component_mut<T: Component>(&self, entity: EntityId) -> Result<ComponentRefMut<T>> {
        self.ensure_not_disposed()?;
        let id = ComponentTypeRegistry::register::<T>();
        let record = self
            .records
            .read()
            .get(&entity)
            .copied()
            .ok_or(EcsError::EntityNotFound)?;
        let archetype = self.index.get(record.archetype_id);
        let column = archetype
            .column_index_of(id)
            .ok_or(EcsError::ComponentMissing)?;
        ComponentTypeRegistry::record_access(id);
        self.log(LogLevel::Trace, EcsOperation::ComponentGet, Some(entity), "component read (mut)");
        Ok(ComponentRefMut::new(
            archetype,
            record.chunk_index as usize,
            record.row_index as usize,
            column,
        ))
    }

    /// Move a live row from `src_archetype` to `dst_archetype`, preserving
    /// every component the two signatures share, then remove the vacated
    /// row from `src_archetype` without double-dropping the values that were
    /// relocated.
    ///
    /// `new_component`, when present, is a `(type, pointer)` pair for a
    /// component that exists in `dst_archetype` but not `src_archetype`
    /// (used by `add_component`); `None` when `dst_archetype`'s signature is
    /// a strict subset of `src_archetype`'s (used by `remove_component` and
    /// `clear_one_frame_data`).
    fn migrate_entity(
        &self,
        entity: EntityId,
        record: EntityLocation,
        src_archetype: &Arc<Archetype>,
        dst_archetype: &Arc<Archetype>,
        new_component: Option<(ComponentTypeId, *const u8)>,
    ) -> EntityLocation {
        let start = Instant::now();
        let plan = self.deltas.get_or_build(src_archetype, dst_archetype);

        // Snapshot every preserved column's bytes before any mutation, since
        // the source row will be swap-removed once the new row exists.
        let mut snapshot: AHashMap<ComponentTypeId, Vec<u8>> = AHashMap::default();
        {
            let chunks = src_archetype.chunks_read();
            let chunk = &chunks[record.chunk_index as usize];
            for &(src_col, dst_col, _size) in &plan.copies {
                let component_id = dst_archetype.component_order()[dst_col];
                let bytes = chunk.column(src_col).row_bytes(record.row_index as usize).to_vec();
                snapshot.insert(component_id, bytes);
            }
        }

        let (chunk_index, row) = dst_archetype.insert_entity(entity, |component_id| {
            if let Some((new_id, ptr)) = new_component {
                if component_id == new_id {
                    return ptr;
                }
            }
            snapshot
                .get(&component_id)
                .expect("every non-new destination column was covered by the delta plan")
                .as_ptr()
        });

        let skip_columns: Vec<usize> = plan.copies.iter().map(|&(src_col, _, _)| src_col).collect();
        let moved = src_archetype.remove_row_skip(
            record.chunk_index as usize,
            record.row_index as usize,
            &skip_columns,
        );
        if let Some(moved_entity) = moved {
            if let Some(loc) = self.records.write().get_mut(&moved_entity) {
                loc.chunk_index = record.chunk_index;
                loc.row_index = record.row_index;
            }
        }

        self.metrics
            .record_migration(src_archetype.id(), dst_archetype.id(), start.elapsed());

        EntityLocation {
            archetype_id: dst_archetype.id(),
            chunk_index: chunk_index as u32,
            row_index: row as u32,
        }
    }

    /// Attach `value` to `entity`. If `entity` already carries a `T`, the
    /// existing value is overwritten in place and a warning is logged,
    /// rather than returning [`EcsError::ComponentAlreadyPresent`] — a
    /// structural no-op is cheaper and less surprising for callers that
    /// call `add_component` as "ensure present with this value".
    pub fn add_component<T: Component>(&self, entity: EntityId, value: T) -> Result<()> {
        self.ensure_not_disposed()?;
        let start = Instant::now();
        let id = ComponentTypeRegistry::register::<T>();
        let record = self
            .records
            .read()
            .get(&entity)
            .copied()
            .ok_or(EcsError::EntityNotFound)?;
        let src_archetype = self.index.get(record.archetype_id);

        if src_archetype.has_component(id) {
            self.log(
                LogLevel::Warn,
                EcsOperation::ComponentAdd,
                Some(entity),
                "add_component overwrote an existing component value",
            );
            *self.get_component_mut::<T>(entity)? = value;
            return Ok(());
        }

        let dst_id = src_archetype.get_or_create_edge(EdgeAction::Add, id, &self.index);
        self.check_archetype_cap();
        let dst_archetype = self.index.get(dst_id);

        let new_loc = self.migrate_entity(
            entity,
            record,
            &src_archetype,
            &dst_archetype,
            Some((id, &value as *const T as *const u8)),
        );
        // The value was bytewise-copied into the destination column by
        // `insert_entity`; forget the local binding so its destructor
        // doesn't also run.
        std::mem::forget(value);
        self.records.write().insert(entity, new_loc);
        self.log(LogLevel::Trace, EcsOperation::ComponentAdd, Some(entity), "component added");
        self.metrics.record_operation("add_component", start.elapsed());
        Ok(())
    }

    /// Detach `T` from `entity`. Silent no-op if `entity` doesn't carry it.
    pub fn remove_component<T: Component>(&self, entity: EntityId) -> Result<()> {
        self.ensure_not_disposed()?;
        let start = Instant::now();
        let id = ComponentTypeRegistry::register::<T>();
        let record = self
            .records
            .read()
            .get(&entity)
            .copied()
            .ok_or(EcsError::EntityNotFound)?;
        let src_archetype = self.index.get(record.archetype_id);

        if !src_archetype.has_component(id) {
            return Ok(());
        }

        let dst_id = src_archetype.get_or_create_edge(EdgeAction::Remove, id, &self.index);
        let dst_archetype = self.index.get(dst_id);

        let new_loc = self.migrate_entity(entity, record, &src_archetype, &dst_archetype, None);
        self.records.write().insert(entity, new_loc);
        self.log(LogLevel::Trace, EcsOperation::ComponentRemove, Some(entity), "component removed");
        self.metrics.record_operation("remove_component", start.elapsed());
        Ok(())
    }

    /// Start building a query over this world's archetypes.
    pub fn query(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.index)
    }

    /// Strip every one-frame component (registered via
    /// [`ComponentTypeRegistry::mark_one_frame`]) from every entity that
    /// carries one, then empty every event channel. Intended to run once at
    /// the end of each tick.
    pub fn clear_one_frame_data(&self) {
        if self.ensure_not_disposed().is_err() {
            return;
        }
        for archetype in self.index.all_sorted() {
            let one_frame_ids: Vec<ComponentTypeId> = archetype
                .signature()
                .ids()
                .filter(|&id| ComponentTypeRegistry::is_one_frame(id))
                .collect();
            if one_frame_ids.is_empty() {
                continue;
            }
            let mut target = archetype.signature().clone();
            for &id in &one_frame_ids {
                target = target.remove(id);
            }
            let dst_id = self.index.get_or_create_signature(&target);
            let dst_archetype = self.index.get(dst_id);

            let chunk_count = archetype.chunk_count();
            for chunk_index in 0..chunk_count {
                loop {
                    let row_count = archetype.chunk_row_count(chunk_index);
                    if row_count == 0 {
                        break;
                    }
                    // Always take the last row: it can never be the target
                    // of another row's swap-remove, so `migrate_entity`
                    // never has to update a second entity's record here.
                    let row = row_count - 1;
                    let entity = archetype.get_entity(chunk_index, row);
                    let record = EntityLocation {
                        archetype_id: archetype.id(),
                        chunk_index: chunk_index as u32,
                        row_index: row as u32,
                    };
                    let new_loc =
                        self.migrate_entity(entity, record, &archetype, &dst_archetype, None);
                    self.records.write().insert(entity, new_loc);
                }
            }
        }
        self.events.clear_all();
        self.metrics.frame_end();
    }

    pub fn publish_event<T: Clone + Send + Sync + 'static>(&self, event: T) {
        self.events.publish(event);
    }

    pub fn subscribe_events<T: Clone + Send + Sync + 'static>(
        &self,
    ) -> crossbeam::channel::Receiver<T> {
        self.events.subscribe::<T>()
    }

    pub fn snapshot_save(&self) -> Result<Vec<u8>> {
        crate::snapshot::save(self)
    }

    pub fn snapshot_load(bytes: &[u8], config: EcsConfig) -> Result<Self> {
        crate::snapshot::load(bytes, config)
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    // --- accessors for `crate::snapshot`, which needs direct access to the
    // archetype set and entity records to walk the world byte-for-byte. ---

    pub(crate) fn index(&self) -> &ArchetypeIndex {
        &self.index
    }

    pub(crate) fn entities(&self) -> &RwLock<EntityRegistry> {
        &self.entities
    }

    pub(crate) fn records(&self) -> &RwLock<AHashMap<EntityId, EntityLocation>> {
        &self.records
    }

    pub(crate) fn config(&self) -> &EcsConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Position {
        x: f32,
        y: f32,
    }
    #[derive(Clone, Copy, PartialEq, Debug)]
    struct Velocity {
        dx: f32,
    }
    #[derive(Clone, Copy)]
    struct OneFrameHit;

    #[test]
    fn spawn_and_read_component() {
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Position { x: 1.0, y: 2.0 },)).unwrap();
        assert!(world.is_alive(e));
        let pos = world.get_component::<Position>(e).unwrap();
        assert_eq!(*pos, Position { x: 1.0, y: 2.0 });
    }

    #[test]
    fn despawn_removes_entity_and_frees_slot() {
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Position { x: 0.0, y: 0.0 },)).unwrap();
        world.despawn(e).unwrap();
        assert!(!world.is_alive(e));
        assert!(world.get_component::<Position>(e).is_err());
    }

    #[test]
    fn despawn_is_silent_on_unknown_entity() {
        let world = World::new(EcsConfig::default());
        let ghost = EntityId::from_parts(999, 1);
        assert!(world.despawn(ghost).is_ok());
    }

    #[test]
    fn add_component_migrates_and_preserves_existing_data() {
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Position { x: 3.0, y: 4.0 },)).unwrap();
        world.add_component(e, Velocity { dx: 9.0 }).unwrap();
        assert_eq!(*world.get_component::<Position>(e).unwrap(), Position { x: 3.0, y: 4.0 });
        assert_eq!(*world.get_component::<Velocity>(e).unwrap(), Velocity { dx: 9.0 });
    }

    #[test]
    fn add_component_on_existing_overwrites_instead_of_erroring() {
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Position { x: 1.0, y: 1.0 },)).unwrap();
        world.add_component(e, Position { x: 5.0, y: 5.0 }).unwrap();
        assert_eq!(*world.get_component::<Position>(e).unwrap(), Position { x: 5.0, y: 5.0 });
    }

    #[test]
    fn remove_component_drops_it_and_keeps_others() {
        let world = World::new(EcsConfig::default());
        let e = world
            .spawn((Position { x: 1.0, y: 1.0 }, Velocity { dx: 2.0 }))
            .unwrap();
        world.remove_component::<Velocity>(e).unwrap();
        assert!(!world.has_component::<Velocity>(e));
        assert_eq!(*world.get_component::<Position>(e).unwrap(), Position { x: 1.0, y: 1.0 });
    }

    #[test]
    fn remove_component_absent_is_noop() {
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Position { x: 1.0, y: 1.0 },)).unwrap();
        assert!(world.remove_component::<Velocity>(e).is_ok());
    }

    #[test]
    fn migration_preserves_other_entities_in_source_archetype() {
        let world = World::new(EcsConfig::default());
        let a = world.spawn((Position { x: 1.0, y: 1.0 },)).unwrap();
        let b = world.spawn((Position { x: 2.0, y: 2.0 },)).unwrap();
        world.add_component(a, Velocity { dx: 1.0 }).unwrap();
        assert_eq!(*world.get_component::<Position>(b).unwrap(), Position { x: 2.0, y: 2.0 });
        assert!(!world.has_component::<Velocity>(b));
    }

    #[test]
    fn clear_one_frame_data_strips_marked_components_only() {
        ComponentTypeRegistry::mark_one_frame::<OneFrameHit>();
        let world = World::new(EcsConfig::default());
        let e = world
            .spawn((Position { x: 0.0, y: 0.0 }, OneFrameHit))
            .unwrap();
        world.clear_one_frame_data();
        assert!(!world.has_component::<OneFrameHit>(e));
        assert!(world.has_component::<Position>(e));
    }

    #[test]
    fn disposed_world_rejects_structural_operations() {
        let world = World::new(EcsConfig::default());
        let e = world.spawn((Position { x: 0.0, y: 0.0 },)).unwrap();
        world.dispose();
        assert!(world.is_disposed());
        assert!(matches!(
            world.add_component(e, Velocity { dx: 1.0 }),
            Err(EcsError::Disposed)
        ));
    }
}
