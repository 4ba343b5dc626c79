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

//! Error types

use std::fmt;

/// ECS error type
#[derive(Debug, Clone)]
pub enum EcsError {
    /// Operation targeted a dead or never-created entity
    EntityNotFound,

    /// `get_component`/`get_component_mut` on an entity whose archetype lacks the component
    ComponentMissing,

    /// Strict `add` attempted on an entity that already carries the component
    ComponentAlreadyPresent,

    /// Structural op on a disposed world, a cycle in system dependencies, or a
    /// snapshot version mismatch
    InvalidOperation(String),

    /// Any call made after `World::dispose`
    Disposed,

    /// Snapshot magic/version/hash mismatch on load
    SnapshotCorrupt(String),

    /// System dependency graph contains a cycle
    SystemCycleDetected,

    /// IO error (file operations, etc.)
    IoError(String),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::EntityNotFound => write!(f, "entity not found"),
            EcsError::ComponentMissing => write!(f, "component missing"),
            EcsError::ComponentAlreadyPresent => write!(f, "component already present"),
            EcsError::InvalidOperation(msg) => write!(f, "invalid operation: {msg}"),
            EcsError::Disposed => write!(f, "world has been disposed"),
            EcsError::SnapshotCorrupt(msg) => write!(f, "snapshot corrupt: {msg}"),
            EcsError::SystemCycleDetected => write!(f, "system dependency cycle detected"),
            EcsError::IoError(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<std::io::Error> for EcsError {
    fn from(err: std::io::Error) -> Self {
        EcsError::IoError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
