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

//! System trait, phases, and declared component access.

use crate::command::CommandBuffer;
use crate::component::ComponentTypeId;
use crate::error::Result;
use crate::world::World;

/// Index of a system within a [`crate::schedule::Schedule`], assigned in
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub u32);

/// Coarse ordering bucket a system runs in. Phases run in the fixed order
/// `EarlyUpdate`, `Update`, `LateUpdate`, then any `Custom` phases in the
/// order they were first seen; systems within a phase are further ordered by
/// `run_after` edges and read/write conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    EarlyUpdate,
    Update,
    LateUpdate,
    Custom(&'static str),
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Update
    }
}

/// A system's declared component reads and writes, used to derive implicit
/// ordering edges: two systems conflict if either writes a type the other
/// reads or writes.
#[derive(Debug, Clone, Default)]
pub struct SystemAccess {
    pub reads: Vec<ComponentTypeId>,
    pub writes: Vec<ComponentTypeId>,
}

impl SystemAccess {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn conflicts_with(&self, other: &SystemAccess) -> bool {
        self.writes.iter().any(|w| other.writes.contains(w))
            || self.writes.iter().any(|w| other.reads.contains(w))
            || self.reads.iter().any(|r| other.writes.contains(r))
    }
}

/// A unit of per-tick logic. `run` mutates the system's own state and reads
/// or structurally mutates `world`; structural mutations queued in `commands`
/// are applied once the whole level containing this system has finished, so
/// no system observes another's mid-level writes (spec: a scheduler level is
/// a barrier).
pub trait System: Send + Sync {
    fn name(&self) -> &'static str;

    /// Which phase this system belongs to. Defaults to [`Phase::Update`].
    fn phase(&self) -> Phase {
        Phase::Update
    }

    /// Names of systems that must complete, in this same phase, before this
    /// one starts. Defaults to no explicit ordering.
    fn run_after(&self) -> &[&'static str] {
        &[]
    }

    fn access(&self) -> SystemAccess;

    fn run(&mut self, world: &World, commands: &mut CommandBuffer) -> Result<()>;
}

pub type BoxedSystem = Box<dyn System>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_write_conflicts() {
        let a = SystemAccess {
            reads: vec![],
            writes: vec![ComponentTypeId(0)],
        };
        let b = SystemAccess {
            reads: vec![],
            writes: vec![ComponentTypeId(0)],
        };
        assert!(a.conflicts_with(&b));
    }

    #[test]
    fn disjoint_reads_do_not_conflict() {
        let a = SystemAccess {
            reads: vec![ComponentTypeId(0)],
            writes: vec![],
        };
        let b = SystemAccess {
            reads: vec![ComponentTypeId(0)],
            writes: vec![],
        };
        assert!(!a.conflicts_with(&b));
    }

    #[test]
    fn read_write_conflicts() {
        let a = SystemAccess {
            reads: vec![ComponentTypeId(1)],
            writes: vec![],
        };
        let b = SystemAccess {
            reads: vec![],
            writes: vec![ComponentTypeId(1)],
        };
        assert!(a.conflicts_with(&b));
    }
}
