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

//! Builds a deterministic, dependency-ordered execution plan from a flat
//! list of systems: explicit `run_after` edges plus implicit read/write
//! conflict edges, grouped into phases and, within each phase, into
//! topologically-sorted parallel levels.

use ahash::AHashMap;
use std::collections::VecDeque;

use crate::error::{EcsError, Result};
use crate::system::{BoxedSystem, Phase, SystemAccess, SystemId};

struct SystemNode {
    id: SystemId,
    name: &'static str,
    phase: Phase,
    access: SystemAccess,
    run_after: Vec<&'static str>,
}

/// One phase's dependency graph: nodes plus the levels they were sorted
/// into. `levels[n]` may run in parallel; level `n` happens-before level
/// `n + 1`.
pub struct SystemGraph {
    node_ids: Vec<SystemId>,
    levels: Vec<Vec<SystemId>>,
}

impl SystemGraph {
    /// Build the graph for one phase's systems and topologically sort them
    /// into levels. Edges: explicit `run_after` (by name, within this phase
    /// only) plus an implicit edge from the earlier-registered of any pair of
    /// conflicting systems to the later-registered one — this both encodes
    /// "don't run conflicting systems in the same level" and gives the
    /// toposort a deterministic tiebreak (registration order) when no
    /// explicit edge says otherwise.
    fn build(nodes: &[SystemNode]) -> Result<Self> {
        let by_name: AHashMap<&'static str, usize> =
            nodes.iter().enumerate().map(|(i, n)| (n.name, i)).collect();

        let n = nodes.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];

        let mut add_edge = |from: usize, to: usize, adjacency: &mut Vec<Vec<usize>>, in_degree: &mut Vec<usize>| {
            if !adjacency[from].contains(&to) {
                adjacency[from].push(to);
                in_degree[to] += 1;
            }
        };

        for (i, node) in nodes.iter().enumerate() {
            for &dep_name in &node.run_after {
                if let Some(&dep_idx) = by_name.get(dep_name) {
                    add_edge(dep_idx, i, &mut adjacency, &mut in_degree);
                }
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if nodes[i].access.conflicts_with(&nodes[j].access) {
                    add_edge(i, j, &mut adjacency, &mut in_degree);
                }
            }
        }

        // Kahn's algorithm, processing same-in-degree nodes in registration
        // order (a `VecDeque` fed in index order), so the sort is
        // deterministic for a fixed system list.
        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut depth = vec![0usize; n];
        let mut visited = 0;
        let mut order = Vec::with_capacity(n);

        while let Some(i) = queue.pop_front() {
            order.push(i);
            visited += 1;
            for &j in &adjacency[i] {
                depth[j] = depth[j].max(depth[i] + 1);
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    queue.push_back(j);
                }
            }
        }

        if visited != n {
            return Err(EcsError::SystemCycleDetected);
        }

        let max_depth = depth.iter().copied().max().unwrap_or(0);
        let mut levels: Vec<Vec<SystemId>> = vec![Vec::new(); max_depth + 1];
        for &i in &order {
            levels[depth[i]].push(nodes[i].id);
        }
        levels.retain(|level| !level.is_empty());

        Ok(Self {
            node_ids: nodes.iter().map(|n| n.id).collect(),
            levels,
        })
    }

    pub fn levels(&self) -> &[Vec<SystemId>] {
        &self.levels
    }

    pub fn system_count(&self) -> usize {
        self.node_ids.len()
    }
}

/// Registered systems plus their compiled per-phase execution graphs.
/// Rebuilt lazily: adding a system invalidates the cached graphs, and the
/// next call that needs them rebuilds from scratch.
pub struct Schedule {
    pub(crate) systems: Vec<BoxedSystem>,
    phases: Vec<Phase>,
    graphs: Option<AHashMap<usize, SystemGraph>>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            phases: Vec::new(),
            graphs: None,
        }
    }

    pub fn with_system(mut self, system: BoxedSystem) -> Self {
        self.add_system(system);
        self
    }

    /// Register a system. Its `phase()` is recorded the first time that
    /// phase is seen, fixing the relative order phases execute in (built-in
    /// phases are always first, in `EarlyUpdate, Update, LateUpdate` order,
    /// ahead of any `Custom` phase, regardless of registration order).
    pub fn add_system(&mut self, system: BoxedSystem) {
        let phase = system.phase();
        if !self.phases.contains(&phase) {
            self.phases.push(phase);
        }
        self.systems.push(system);
        self.graphs = None;
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    fn ordered_phases(&self) -> Vec<Phase> {
        let builtin = [Phase::EarlyUpdate, Phase::Update, Phase::LateUpdate];
        let mut ordered: Vec<Phase> = builtin
            .into_iter()
            .filter(|p| self.phases.contains(p))
            .collect();
        for &p in &self.phases {
            if !builtin.contains(&p) && !ordered.contains(&p) {
                ordered.push(p);
            }
        }
        ordered
    }

    /// Rebuild every phase's graph. Phases not yet registered are absent
    /// from the result, not an empty level list.
    fn rebuild(&mut self) -> Result<()> {
        let mut graphs = AHashMap::default();
        for (phase_index, &phase) in self.ordered_phases().iter().enumerate() {
            let nodes: Vec<SystemNode> = self
                .systems
                .iter()
                .enumerate()
                .filter(|(_, s)| s.phase() == phase)
                .map(|(i, s)| SystemNode {
                    id: SystemId(i as u32),
                    name: s.name(),
                    phase,
                    access: s.access(),
                    run_after: s.run_after().to_vec(),
                })
                .collect();
            graphs.insert(phase_index, SystemGraph::build(&nodes)?);
        }
        self.graphs = Some(graphs);
        Ok(())
    }

    pub(crate) fn ensure_built(&mut self) -> Result<()> {
        if self.graphs.is_none() {
            self.rebuild()?;
        }
        Ok(())
    }

    /// Phases in execution order, each paired with its compiled level plan.
    /// Call [`Self::ensure_built`] first.
    pub(crate) fn phase_plan(&self) -> Vec<(Phase, &SystemGraph)> {
        let graphs = self.graphs.as_ref().expect("ensure_built was called");
        self.ordered_phases()
            .into_iter()
            .enumerate()
            .map(|(i, phase)| (phase, &graphs[&i]))
            .collect()
    }

    pub(crate) fn system_mut(&mut self, id: SystemId) -> &mut BoxedSystem {
        &mut self.systems[id.0 as usize]
    }

    /// Owned copy of every phase's level plan, in execution order. Used by
    /// [`crate::executor::SystemScheduler`], which needs `&mut self.systems`
    /// free of any borrow on `self.graphs` while it dispatches each level.
    pub(crate) fn phase_levels(&mut self) -> Result<Vec<(Phase, Vec<Vec<SystemId>>)>> {
        self.ensure_built()?;
        let ordered = self.ordered_phases();
        let graphs = self.graphs.as_ref().expect("ensure_built was called");
        Ok(ordered
            .into_iter()
            .enumerate()
            .map(|(i, phase)| (phase, graphs[&i].levels().to_vec()))
            .collect())
    }
}
