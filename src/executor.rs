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

//! Drives a [`Schedule`] to completion: for each phase, for each level in
//! order, runs every system in that level (in parallel under the `parallel`
//! feature), flushes their queued commands, then proceeds to the next level.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::command::CommandBuffer;
use crate::error::{EcsError, Result};
use crate::schedule::Schedule;
use crate::system::{BoxedSystem, Phase, SystemId};
use crate::world::World;

/// Min/max/avg/call-count timing rollup for one system.
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub min: Duration,
    pub max: Duration,
    pub avg: Duration,
    pub call_count: u64,
}

/// Accumulates per-system execution timings across ticks.
#[derive(Default)]
pub struct SystemProfiler {
    timings: HashMap<SystemId, Vec<Duration>>,
}

impl SystemProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, id: SystemId, duration: Duration) {
        self.timings.entry(id).or_default().push(duration);
    }

    pub fn stats(&self, id: SystemId) -> Option<SystemStats> {
        let timings = self.timings.get(&id)?;
        if timings.is_empty() {
            return None;
        }
        let min = *timings.iter().min().unwrap();
        let max = *timings.iter().max().unwrap();
        let avg = timings.iter().sum::<Duration>() / timings.len() as u32;
        Some(SystemStats {
            min,
            max,
            avg,
            call_count: timings.len() as u64,
        })
    }

    pub fn clear(&mut self) {
        self.timings.clear();
    }
}

struct LevelOutcome {
    id: SystemId,
    duration: Duration,
    result: Result<()>,
    commands: CommandBuffer,
}

#[cfg(feature = "parallel")]
fn run_level(systems: &mut [BoxedSystem], level: &[SystemId], world: &World) -> Vec<LevelOutcome> {
    use rayon::prelude::*;
    let wanted: ahash::AHashSet<u32> = level.iter().map(|id| id.0).collect();
    systems
        .par_iter_mut()
        .enumerate()
        .filter_map(|(idx, system)| {
            if !wanted.contains(&(idx as u32)) {
                return None;
            }
            let mut commands = CommandBuffer::new();
            let start = Instant::now();
            let result = system.run(world, &mut commands);
            Some(LevelOutcome {
                id: SystemId(idx as u32),
                duration: start.elapsed(),
                result,
                commands,
            })
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_level(systems: &mut [BoxedSystem], level: &[SystemId], world: &World) -> Vec<LevelOutcome> {
    level
        .iter()
        .map(|&id| {
            let system = &mut systems[id.0 as usize];
            let mut commands = CommandBuffer::new();
            let start = Instant::now();
            let result = system.run(world, &mut commands);
            LevelOutcome {
                id,
                duration: start.elapsed(),
                result,
                commands,
            }
        })
        .collect()
}

/// Owns a [`Schedule`] and the timing history for the systems in it.
pub struct SystemScheduler {
    schedule: Schedule,
    profiler: SystemProfiler,
}

impl SystemScheduler {
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            profiler: SystemProfiler::new(),
        }
    }

    pub fn add_system(&mut self, system: BoxedSystem) {
        self.schedule.add_system(system);
    }

    pub fn profiler(&self) -> &SystemProfiler {
        &self.profiler
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Run every registered phase once, in phase order. Within a phase, run
    /// each level in order and flush that level's queued commands (from
    /// systems that returned `Ok`) before the next level starts — the
    /// barrier spec calls for between levels. A faulting system does not
    /// stop its siblings: every system in the phase still runs, and their
    /// errors are collected into one aggregate [`EcsError::InvalidOperation`]
    /// surfaced after the whole phase completes.
    pub fn run(&mut self, world: &World) -> Result<()> {
        let plan = self.schedule.phase_levels()?;
        let mut failures: Vec<String> = Vec::new();

        for (_phase, levels) in &plan {
            for level in levels {
                let outcomes = run_level(&mut self.schedule.systems, level, world);
                for outcome in outcomes {
                    self.profiler.record(outcome.id, outcome.duration);
                    match outcome.result {
                        Ok(()) => {
                            let mut commands = outcome.commands;
                            if let Err(e) = commands.apply(world) {
                                failures.push(format!("system {:?} command flush: {e}", outcome.id));
                            }
                        }
                        Err(e) => {
                            failures.push(format!("system {:?}: {e}", outcome.id));
                        }
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(EcsError::InvalidOperation(failures.join("; ")))
        }
    }

    /// Run only the levels belonging to one phase. Useful for callers that
    /// drive `EarlyUpdate`/`Update`/`LateUpdate` at different cadences.
    pub fn run_phase(&mut self, world: &World, phase: Phase) -> Result<()> {
        let plan = self.schedule.phase_levels()?;
        let Some((_, levels)) = plan.into_iter().find(|(p, _)| *p == phase) else {
            return Ok(());
        };
        let mut failures: Vec<String> = Vec::new();
        for level in &levels {
            let outcomes = run_level(&mut self.schedule.systems, level, world);
            for outcome in outcomes {
                self.profiler.record(outcome.id, outcome.duration);
                match outcome.result {
                    Ok(()) => {
                        let mut commands = outcome.commands;
                        if let Err(e) = commands.apply(world) {
                            failures.push(format!("system {:?} command flush: {e}", outcome.id));
                        }
                    }
                    Err(e) => failures.push(format!("system {:?}: {e}", outcome.id)),
                }
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(EcsError::InvalidOperation(failures.join("; ")))
        }
    }
}
