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

//! Health/metrics sink: operation timings, query timings, migration
//! timings, frame boundaries, and memory events, with a rolling in-memory
//! implementation generalized from the teacher's `SystemProfiler`
//! (min/max/avg/call_count per operation).

use std::time::Duration;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::archetype::ArchetypeId;

/// Coarse health signal derived from recent metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

/// A memory-related event worth tracking: chunk allocation/free, archetype
/// creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryEvent {
    ChunkAllocated { archetype: ArchetypeId },
    ChunkFreed { archetype: ArchetypeId },
    ArchetypeCreated { archetype: ArchetypeId },
}

/// min/max/avg/call_count rollup, mirroring the teacher's `SystemStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationStats {
    pub min: Duration,
    pub max: Duration,
    pub avg: Duration,
    pub call_count: u64,
}

/// Snapshot of everything a [`MetricsSink`] has observed, for external
/// reporting (dashboards, health checks).
#[derive(Debug, Clone)]
pub struct PerformanceSnapshot {
    pub operations: Vec<(&'static str, DurationStats)>,
    pub queries: Vec<(&'static str, DurationStats)>,
    pub migrations: u64,
    pub frames_completed: u64,
    pub memory_events: u64,
    pub health: HealthStatus,
}

/// Sink interface for ECS performance/health telemetry.
pub trait MetricsSink: Send + Sync {
    fn record_operation(&self, operation: &'static str, duration: Duration);
    fn record_query(&self, query: &'static str, entity_count: usize, duration: Duration);
    fn record_migration(&self, from: ArchetypeId, to: ArchetypeId, duration: Duration);
    fn frame_start(&self);
    fn frame_end(&self);
    fn record_memory_event(&self, event: MemoryEvent);
    fn health(&self) -> HealthStatus;
    fn snapshot(&self) -> PerformanceSnapshot;
}

/// Empty sink — the default. Every method is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetricsSink;

impl MetricsSink for NullMetricsSink {
    fn record_operation(&self, _operation: &'static str, _duration: Duration) {}
    fn record_query(&self, _query: &'static str, _entity_count: usize, _duration: Duration) {}
    fn record_migration(&self, _from: ArchetypeId, _to: ArchetypeId, _duration: Duration) {}
    fn frame_start(&self) {}
    fn frame_end(&self) {}
    fn record_memory_event(&self, _event: MemoryEvent) {}
    fn health(&self) -> HealthStatus {
        HealthStatus::Healthy
    }
    fn snapshot(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            operations: Vec::new(),
            queries: Vec::new(),
            migrations: 0,
            frames_completed: 0,
            memory_events: 0,
            health: HealthStatus::Healthy,
        }
    }
}

#[derive(Default)]
struct Timings {
    samples: Vec<Duration>,
}

impl Timings {
    fn record(&mut self, d: Duration) {
        self.samples.push(d);
    }

    fn stats(&self) -> DurationStats {
        if self.samples.is_empty() {
            return DurationStats {
                min: Duration::ZERO,
                max: Duration::ZERO,
                avg: Duration::ZERO,
                call_count: 0,
            };
        }
        let min = *self.samples.iter().min().unwrap();
        let max = *self.samples.iter().max().unwrap();
        let avg = self.samples.iter().sum::<Duration>() / self.samples.len() as u32;
        DurationStats {
            min,
            max,
            avg,
            call_count: self.samples.len() as u64,
        }
    }
}

/// In-memory rolling implementation. Bounds memory by capping stored
/// samples per key at `max_samples_per_key` (oldest dropped first), since an
/// unbounded metrics sink would itself become a leak.
pub struct RollingMetricsSink {
    max_samples_per_key: usize,
    operations: Mutex<AHashMap<&'static str, Timings>>,
    queries: Mutex<AHashMap<&'static str, Timings>>,
    migrations: Mutex<u64>,
    frames_completed: Mutex<u64>,
    memory_events: Mutex<u64>,
    warning_threshold: Duration,
    critical_threshold: Duration,
}

impl RollingMetricsSink {
    pub fn new(max_samples_per_key: usize) -> Self {
        Self {
            max_samples_per_key,
            operations: Mutex::new(AHashMap::default()),
            queries: Mutex::new(AHashMap::default()),
            migrations: Mutex::new(0),
            frames_completed: Mutex::new(0),
            memory_events: Mutex::new(0),
            warning_threshold: Duration::from_millis(16),
            critical_threshold: Duration::from_millis(50),
        }
    }

    fn cap(timings: &mut Timings, max: usize) {
        if timings.samples.len() > max {
            let overflow = timings.samples.len() - max;
            timings.samples.drain(0..overflow);
        }
    }
}

impl Default for RollingMetricsSink {
    fn default() -> Self {
        Self::new(256)
    }
}

impl MetricsSink for RollingMetricsSink {
    fn record_operation(&self, operation: &'static str, duration: Duration) {
        let mut ops = self.operations.lock();
        let timings = ops.entry(operation).or_default();
        timings.record(duration);
        Self::cap(timings, self.max_samples_per_key);
    }

    fn record_query(&self, query: &'static str, _entity_count: usize, duration: Duration) {
        let mut queries = self.queries.lock();
        let timings = queries.entry(query).or_default();
        timings.record(duration);
        Self::cap(timings, self.max_samples_per_key);
    }

    fn record_migration(&self, _from: ArchetypeId, _to: ArchetypeId, duration: Duration) {
        *self.migrations.lock() += 1;
        self.record_operation("archetype_migration", duration);
    }

    fn frame_start(&self) {}

    fn frame_end(&self) {
        *self.frames_completed.lock() += 1;
    }

    fn record_memory_event(&self, _event: MemoryEvent) {
        *self.memory_events.lock() += 1;
    }

    fn health(&self) -> HealthStatus {
        let ops = self.operations.lock();
        let worst = ops
            .values()
            .map(|t| t.stats().max)
            .max()
            .unwrap_or(Duration::ZERO);
        if worst >= self.critical_threshold {
            HealthStatus::Critical
        } else if worst >= self.warning_threshold {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }

    fn snapshot(&self) -> PerformanceSnapshot {
        let operations = self
            .operations
            .lock()
            .iter()
            .map(|(k, v)| (*k, v.stats()))
            .collect();
        let queries = self
            .queries
            .lock()
            .iter()
            .map(|(k, v)| (*k, v.stats()))
            .collect();
        PerformanceSnapshot {
            operations,
            queries,
            migrations: *self.migrations.lock(),
            frames_completed: *self.frames_completed.lock(),
            memory_events: *self.memory_events.lock(),
            health: self.health(),
        }
    }
}
