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

//! Component identity and bundles.
//!
//! Components are data attached to entities. Every component type is
//! assigned a dense, process-wide [`ComponentTypeId`] the first time it's
//! seen; bundles group several component values for a single spawn call.

use std::any::TypeId;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::OnceLock;

use ahash::AHashMap;
use parking_lot::RwLock;
use smallvec::{smallvec, SmallVec};

/// Maximum number of components supported by [`Bundle`] implementations.
pub const MAX_BUNDLE_COMPONENTS: usize = 8;

/// Marker trait for components. Components must be `'static` (no borrowed
/// data) and `Send + Sync` so archetypes can move between worker threads.
pub trait Component: 'static + Send + Sync {}

impl<T: 'static + Send + Sync> Component for T {}

/// Dense, process-wide component type identifier. Stable for the lifetime of
/// the process; reassigned from scratch (but deterministically, in
/// first-seen order) each time the process starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeId(pub u32);

impl ComponentTypeId {
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

/// Size/alignment/drop metadata for a registered component type, keyed by
/// [`ComponentTypeId`]. Lets type-erased storage ([`crate::storage`]) build
/// and tear down columns without generic parameters.
#[derive(Clone, Copy)]
pub struct ComponentInfo {
    pub size: usize,
    pub align: usize,
    pub needs_drop: bool,
    pub drop_in_place: unsafe fn(*mut u8),
    pub is_one_frame: bool,
    pub name: &'static str,
}

unsafe fn drop_in_place_of<T>(ptr: *mut u8) {
    std::ptr::drop_in_place(ptr as *mut T);
}

static NEXT_ID: AtomicU32 = AtomicU32::new(0);
static BY_TYPE: OnceLock<RwLock<AHashMap<TypeId, ComponentTypeId>>> = OnceLock::new();
static INFO: OnceLock<RwLock<Vec<ComponentInfo>>> = OnceLock::new();
static ACCESS_COUNTS: OnceLock<RwLock<Vec<AtomicU64>>> = OnceLock::new();

fn by_type() -> &'static RwLock<AHashMap<TypeId, ComponentTypeId>> {
    BY_TYPE.get_or_init(|| RwLock::new(AHashMap::default()))
}

fn info() -> &'static RwLock<Vec<ComponentInfo>> {
    INFO.get_or_init(|| RwLock::new(Vec::new()))
}

fn access_counts() -> &'static RwLock<Vec<AtomicU64>> {
    ACCESS_COUNTS.get_or_init(|| RwLock::new(Vec::new()))
}

/// Registry of process-wide component type identities.
///
/// Holds no per-world state; `ComponentTypeId` assignment is a process-wide
/// side table (atomic counter plus a double-checked map), not something
/// tied to any single [`crate::world::World`].
pub struct ComponentTypeRegistry;

impl ComponentTypeRegistry {
    /// Look up (and assign, if this is the first time) the dense id for `T`.
    /// Idempotent: repeated calls for the same `T` always return the same id.
    pub fn register<T: Component>() -> ComponentTypeId {
        let tid = TypeId::of::<T>();
        if let Some(&id) = by_type().read().get(&tid) {
            return id;
        }
        let mut map = by_type().write();
        if let Some(&id) = map.get(&tid) {
            return id;
        }
        let id = ComponentTypeId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        map.insert(tid, id);
        info().write().push(ComponentInfo {
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
            needs_drop: std::mem::needs_drop::<T>(),
            drop_in_place: drop_in_place_of::<T>,
            is_one_frame: false,
            name: std::any::type_name::<T>(),
        });
        id
    }

    /// Marks `T` (registering it first if needed) as a one-frame component:
    /// [`crate::world::World::clear_one_frame_data`] strips it from every
    /// entity at the end of each frame.
    pub fn mark_one_frame<T: Component>() -> ComponentTypeId {
        let id = Self::register::<T>();
        info().write()[id.as_usize()].is_one_frame = true;
        id
    }

    /// Human-readable name for a previously-registered id, for logging.
    pub fn name_of(id: ComponentTypeId) -> &'static str {
        info()
            .read()
            .get(id.as_usize())
            .map(|i| i.name)
            .unwrap_or("<unknown component type>")
    }

    /// Layout/drop metadata for a previously-registered id.
    pub fn info_of(id: ComponentTypeId) -> ComponentInfo {
        info().read()[id.as_usize()]
    }

    /// True if `id` was registered via [`Self::mark_one_frame`].
    pub fn is_one_frame(id: ComponentTypeId) -> bool {
        info()
            .read()
            .get(id.as_usize())
            .map(|i| i.is_one_frame)
            .unwrap_or(false)
    }

    /// Number of distinct component types registered so far in this process.
    pub fn count() -> usize {
        info().read().len()
    }

    /// Record one read/write touch of `id`, feeding the access-frequency
    /// tiering [`crate::archetype::Archetype`] uses to order its columns.
    pub fn record_access(id: ComponentTypeId) {
        {
            let counts = access_counts().read();
            if let Some(c) = counts.get(id.as_usize()) {
                c.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        let mut counts = access_counts().write();
        while counts.len() <= id.as_usize() {
            counts.push(AtomicU64::new(0));
        }
        counts[id.as_usize()].fetch_add(1, Ordering::Relaxed);
    }

    /// Current access count for `id`, or 0 if never recorded.
    pub fn access_count(id: ComponentTypeId) -> u64 {
        access_counts()
            .read()
            .get(id.as_usize())
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

/// A group of components spawned onto an entity atomically.
pub trait Bundle: Send + Sync + 'static {
    /// Dense type ids of every component in the bundle, in declaration order.
    fn component_type_ids() -> SmallVec<[ComponentTypeId; MAX_BUNDLE_COMPONENTS]>
    where
        Self: Sized;

    /// Byte size of each component in the bundle, in declaration order.
    fn component_sizes() -> SmallVec<[usize; MAX_BUNDLE_COMPONENTS]>
    where
        Self: Sized;

    /// Write each component to its destination pointer.
    ///
    /// # Safety
    /// Caller must ensure `ptrs[i]` is valid, suitably aligned for the i-th
    /// component type, and not aliased by any other live reference.
    unsafe fn write_components(self, ptrs: &[*mut u8]);
}

macro_rules! impl_bundle {
    ($($T:ident),*) => {
        impl<$($T: Component),*> Bundle for ($($T,)*) {
            fn component_type_ids() -> SmallVec<[ComponentTypeId; MAX_BUNDLE_COMPONENTS]> {
                smallvec![$(ComponentTypeRegistry::register::<$T>()),*]
            }

            fn component_sizes() -> SmallVec<[usize; MAX_BUNDLE_COMPONENTS]> {
                smallvec![$(std::mem::size_of::<$T>()),*]
            }

            #[allow(non_snake_case)]
            unsafe fn write_components(self, ptrs: &[*mut u8]) {
                let ($($T,)*) = self;
                let mut i = 0;
                $(
                    std::ptr::write(ptrs[i] as *mut $T, $T);
                    i += 1;
                )*
                let _ = i;
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

/// The empty bundle, for spawning an entity with no components.
impl Bundle for () {
    fn component_type_ids() -> SmallVec<[ComponentTypeId; MAX_BUNDLE_COMPONENTS]> {
        SmallVec::new()
    }

    fn component_sizes() -> SmallVec<[usize; MAX_BUNDLE_COMPONENTS]> {
        SmallVec::new()
    }

    unsafe fn write_components(self, _ptrs: &[*mut u8]) {}
}
