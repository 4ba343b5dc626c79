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

//! Archetype-based ECS runtime: chunked columnar storage, a cached
//! archetype graph, and a parallel system scheduler.

pub mod archetype;
pub mod archetype_index;
pub mod bitset;
pub mod command;
pub mod component;
pub mod config;
pub mod delta;
pub mod entity;
pub mod error;
pub mod event_channel;
pub mod logging;
pub mod metrics;
pub mod pool;
pub mod prelude;
pub mod query;
pub mod signature;
pub mod simd;
pub mod snapshot;
pub mod storage;
pub mod world;

// Parallel system scheduler.
pub mod executor;
pub mod schedule;
pub mod system;

pub use archetype::{Archetype, ArchetypeId};
pub use component::{Bundle, Component, ComponentTypeId};
pub use config::EcsConfig;
pub use entity::EntityId;
pub use error::{EcsError, Result};
pub use query::QueryBuilder;
pub use world::{ComponentRef, ComponentRefMut, World};

pub use command::CommandBuffer;
pub use executor::{SystemProfiler, SystemScheduler};
pub use schedule::{Schedule, SystemGraph};
pub use system::{BoxedSystem, Phase, System, SystemAccess, SystemId};
