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

//! World configuration: chunk capacity, pool sizes, and worker thread count.
//! Loadable from TOML or overridden per-field from `ECS_*` environment
//! variables, in the pattern of `rodengine`'s `PersistenceConfig`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::archetype_index::SMALL_RESULT_THRESHOLD;
use crate::error::{EcsError, Result};
use crate::pool::MAX_POOL_SIZE;
use crate::storage::DEFAULT_CHUNK_CAPACITY;

/// Tunable knobs for a [`crate::world::World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcsConfig {
    /// Row capacity of a freshly-allocated chunk.
    pub chunk_capacity: usize,
    /// Soft cap on distinct archetypes before a warning is logged; 0 disables.
    pub max_archetypes: usize,
    /// Per-thread pool bound for bitset/scratch buffer reuse.
    pub max_pool_size: usize,
    /// Query results at or below this size are returned without heap allocation.
    pub query_cache_small_result_threshold: usize,
    /// Worker thread count for the system scheduler; 0 means "use all cores".
    pub worker_threads: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            max_archetypes: 0,
            max_pool_size: MAX_POOL_SIZE,
            query_cache_small_result_threshold: SMALL_RESULT_THRESHOLD,
            worker_threads: 0,
        }
    }
}

impl EcsConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| EcsError::InvalidOperation(format!("invalid config toml: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Apply `ECS_CHUNK_CAPACITY`, `ECS_MAX_ARCHETYPES`, `ECS_MAX_POOL_SIZE`,
    /// `ECS_QUERY_CACHE_SMALL_RESULT_THRESHOLD`, and `ECS_WORKER_THREADS`
    /// environment overrides on top of this config, where present and
    /// parseable.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_usize("ECS_CHUNK_CAPACITY") {
            self.chunk_capacity = v;
        }
        if let Some(v) = env_usize("ECS_MAX_ARCHETYPES") {
            self.max_archetypes = v;
        }
        if let Some(v) = env_usize("ECS_MAX_POOL_SIZE") {
            self.max_pool_size = v;
        }
        if let Some(v) = env_usize("ECS_QUERY_CACHE_SMALL_RESULT_THRESHOLD") {
            self.query_cache_small_result_threshold = v;
        }
        if let Some(v) = env_usize("ECS_WORKER_THREADS") {
            self.worker_threads = v;
        }
        self
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok()?.parse().ok()
}
