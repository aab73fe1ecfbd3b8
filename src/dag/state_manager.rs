// src/dag/state_manager.rs

//! State transitions within one run.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::dag::BuildGraph;
use crate::dag::run_state::{RunState, ScheduledTask, TaskSlot};
use crate::types::TaskId;

/// Mutable view over the scheduler's slots for the duration of one call.
pub(crate) struct StateManager<'a> {
    graph: &'a BuildGraph,
    slots: &'a mut BTreeMap<TaskId, TaskSlot>,
    run_id: u64,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a BuildGraph, slots: &'a mut BTreeMap<TaskId, TaskSlot>, run_id: u64) -> Self {
        Self {
            graph,
            slots,
            run_id,
        }
    }

    /// Add `root` and everything downstream of it to the run.
    ///
    /// Tasks already in the run keep their state.
    pub fn enroll_with_dependents(&mut self, root: TaskId) {
        let mut seen = BTreeSet::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(slot) = self.slots.get_mut(&id) else {
                continue;
            };
            if slot.state.is_none() {
                slot.state = Some(RunState::Pending);
                debug!(task = %id, run_id = self.run_id, "enrolled in run");
            }
            stack.extend_from_slice(self.graph.dependents_of(id));
        }
    }

    /// Enroll upstream tasks that are outside the run and have never
    /// succeeded, repeating until nothing changes.
    ///
    /// Without this a pending task could wait forever on a dependency that
    /// nobody triggered.
    pub fn enroll_missing_upstream(&mut self) {
        loop {
            let missing: BTreeSet<TaskId> = self
                .slots
                .values()
                .filter(|slot| slot.is_pending())
                .flat_map(|slot| slot.deps.iter().copied())
                .filter(|dep| {
                    self.slots
                        .get(dep)
                        .is_some_and(|d| d.state.is_none() && d.last_success.is_none())
                })
                .collect();

            if missing.is_empty() {
                return;
            }

            for dep in missing {
                if let Some(slot) = self.slots.get_mut(&dep) {
                    debug!(task = %dep, run_id = self.run_id, "upstream never succeeded; enrolling it");
                    slot.state = Some(RunState::Pending);
                }
            }
        }
    }

    /// Mark `task` succeeded in this run.
    pub fn succeed(&mut self, task: TaskId) -> bool {
        let Some(slot) = self.slots.get_mut(&task) else {
            return false;
        };
        slot.state = Some(RunState::Succeeded);
        slot.last_success = Some(self.run_id);
        true
    }

    /// Mark `task` failed, then every unfinished task downstream of it.
    ///
    /// Returns the failed tasks, `task` first; empty if `task` is unknown.
    pub fn fail(&mut self, task: TaskId) -> Vec<TaskId> {
        let Some(slot) = self.slots.get_mut(&task) else {
            return Vec::new();
        };
        slot.state = Some(RunState::Failed);
        slot.last_failure = Some(self.run_id);

        let mut failed = vec![task];
        let mut stack = self.graph.dependents_of(task).to_vec();
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.get_mut(&id) else {
                continue;
            };
            if slot.is_unfinished() {
                slot.state = Some(RunState::Failed);
                debug!(task = %id, upstream = %task, "failed with upstream");
                failed.push(id);
                stack.extend_from_slice(self.graph.dependents_of(id));
            }
        }
        failed
    }

    /// Move every pending task whose dependencies are met to `Running`.
    pub fn take_ready(&mut self) -> Vec<ScheduledTask> {
        let ready: Vec<TaskId> = self
            .graph
            .topological_order()
            .iter()
            .copied()
            .filter(|id| {
                self.slots
                    .get(id)
                    .is_some_and(|slot| slot.is_pending() && deps_met(&*self.slots, slot))
            })
            .collect();

        ready
            .into_iter()
            .filter_map(|id| {
                let slot = self.slots.get_mut(&id)?;
                info!(
                    task = %id,
                    run_id = self.run_id,
                    rerun = slot.has_history(),
                    "scheduling task"
                );
                slot.state = Some(RunState::Running);
                Some(ScheduledTask::new(id, self.run_id))
            })
            .collect()
    }
}

/// A dependency in the run must have succeeded in it; one outside the run
/// must have succeeded in some earlier run.
pub(crate) fn deps_met(slots: &BTreeMap<TaskId, TaskSlot>, slot: &TaskSlot) -> bool {
    slot.deps.iter().all(|dep| match slots.get(dep) {
        Some(d) => match d.state {
            Some(state) => state == RunState::Succeeded,
            None => d.last_success.is_some(),
        },
        None => false,
    })
}
