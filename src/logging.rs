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

//! Structured logging sink. Core operations emit through a `dyn LogSink`
//! rather than calling `tracing` macros directly, so hosts that don't want
//! the `profiling` feature pay nothing for it.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::component::ComponentTypeId;
use crate::entity::EntityId;

/// Log severity, matching `tracing`'s level ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Tag identifying which core operation produced a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsOperation {
    EntityCreate,
    EntityDestroy,
    ComponentAdd,
    ComponentRemove,
    ComponentGet,
    ArchetypeTransition,
    QueryExecute,
}

/// A single structured log event.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub operation: EcsOperation,
    pub entity: Option<EntityId>,
    pub component_type_name: Option<&'static str>,
    pub correlation_id: u64,
    pub message: &'static str,
}

/// Thread-local correlation id, bumped once per call into a logging sink.
/// Lets a caller that sets a custom value (e.g. a request id) have every
/// event it causes share that value.
thread_local! {
    static CORRELATION_ID: std::cell::Cell<u64> = const { std::cell::Cell::new(0) };
}

static CORRELATION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Replace the thread-local correlation id used by subsequent log events on
/// this thread.
pub fn set_correlation_id(id: u64) {
    CORRELATION_ID.with(|c| c.set(id));
}

/// Allocate and install a fresh correlation id for this thread, returning it.
pub fn next_correlation_id() -> u64 {
    let id = CORRELATION_SEQ.fetch_add(1, Ordering::Relaxed);
    set_correlation_id(id);
    id
}

pub fn current_correlation_id() -> u64 {
    CORRELATION_ID.with(|c| c.get())
}

/// Sink interface for structured ECS log events.
pub trait LogSink: Send + Sync {
    fn log(&self, event: LogEvent);
}

/// Empty, branchless no-op sink — the default for a [`crate::world::World`]
/// that hasn't been given a real sink. Every call compiles away to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    #[inline(always)]
    fn log(&self, _event: LogEvent) {}
}

/// Emits events through the `tracing` crate. Only compiled in under the
/// `profiling` feature, matching the teacher's existing feature gate for
/// its `tracing`/`tracing-subscriber`/`tracing-appender` trio.
#[cfg(feature = "profiling")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

#[cfg(feature = "profiling")]
impl LogSink for TracingLogSink {
    fn log(&self, event: LogEvent) {
        match event.level {
            LogLevel::Trace => tracing::trace!(
                operation = ?event.operation,
                entity = ?event.entity,
                component = event.component_type_name,
                correlation_id = event.correlation_id,
                "{}", event.message
            ),
            LogLevel::Debug => tracing::debug!(
                operation = ?event.operation,
                entity = ?event.entity,
                component = event.component_type_name,
                correlation_id = event.correlation_id,
                "{}", event.message
            ),
            LogLevel::Info => tracing::info!(
                operation = ?event.operation,
                entity = ?event.entity,
                component = event.component_type_name,
                correlation_id = event.correlation_id,
                "{}", event.message
            ),
            LogLevel::Warn => tracing::warn!(
                operation = ?event.operation,
                entity = ?event.entity,
                component = event.component_type_name,
                correlation_id = event.correlation_id,
                "{}", event.message
            ),
            LogLevel::Error => tracing::error!(
                operation = ?event.operation,
                entity = ?event.entity,
                component = event.component_type_name,
                correlation_id = event.correlation_id,
                "{}", event.message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sink_accepts_any_event() {
        let sink = NullLogSink;
        sink.log(LogEvent {
            level: LogLevel::Error,
            operation: EcsOperation::EntityCreate,
            entity: None,
            component_type_name: None,
            correlation_id: 0,
            message: "noop",
        });
    }

    #[test]
    fn correlation_id_is_per_thread() {
        set_correlation_id(7);
        assert_eq!(current_correlation_id(), 7);
    }
}
