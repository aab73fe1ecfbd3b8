// src/dag/scheduler.rs

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::graph::BuildGraph;
use crate::dag::run_state::{ScheduledTask, SchedulerStep, TaskRunState, TaskSlot};
use crate::dag::state_manager::{deps_met, StateManager};
use crate::engine::TaskOutcome;
use crate::types::TaskId;

/// Decides which tasks run, and when, for one pipeline.
///
/// Work happens in runs. A trigger outside a run opens one; the run closes
/// once none of its tasks is pending or running. Success history survives
/// between runs, so a bundle triggered on its own can rely on stylesheets
/// compiled in an earlier run.
#[derive(Debug)]
pub struct Scheduler {
    graph: BuildGraph,
    slots: BTreeMap<TaskId, TaskSlot>,
    runs_started: u64,
    active_run: Option<u64>,
}

impl Scheduler {
    pub fn new(graph: BuildGraph) -> Self {
        let slots = graph
            .tasks()
            .map(|id| (id, TaskSlot::new(id, graph.dependencies_of(id).to_vec())))
            .collect();

        Self {
            graph,
            slots,
            runs_started: 0,
            active_run: None,
        }
    }

    pub fn graph(&self) -> &BuildGraph {
        &self.graph
    }

    pub fn is_idle(&self) -> bool {
        self.active_run.is_none()
    }

    /// `None` for tasks outside this pipeline.
    pub fn run_state_of(&self, task: TaskId) -> Option<TaskRunState> {
        self.slots.get(&task).map(|slot| TaskRunState::of(slot.state))
    }

    /// Tasks enrolled in the active run; empty when idle.
    pub fn tasks_in_current_run(&self) -> Vec<TaskId> {
        if self.is_idle() {
            return Vec::new();
        }
        self.slots
            .values()
            .filter(|slot| slot.state.is_some())
            .map(|slot| slot.id)
            .collect()
    }

    /// `None` for tasks outside this pipeline.
    pub fn deps_satisfied(&self, task: TaskId) -> Option<bool> {
        let slot = self.slots.get(&task)?;
        Some(deps_met(&self.slots, slot))
    }

    /// Open a new run with nobody enrolled.
    pub fn start_new_run(&mut self) {
        self.runs_started += 1;
        self.active_run = Some(self.runs_started);
        for slot in self.slots.values_mut() {
            slot.state = None;
        }
        debug!(run_id = self.runs_started, "run opened");
    }

    pub fn handle_trigger(&mut self, task: TaskId) -> Vec<ScheduledTask> {
        self.step_triggers(&[task]).newly_scheduled
    }

    /// Enroll every task in `tasks` before dispatching anything, so an
    /// upstream task enrolled on behalf of one trigger is not started ahead
    /// of its own trigger in the same batch.
    pub fn handle_triggers(&mut self, tasks: &[TaskId]) -> Vec<ScheduledTask> {
        self.step_triggers(tasks).newly_scheduled
    }

    /// A long-lived task is up; for its dependents that counts as success.
    pub fn handle_progress(&mut self, task: TaskId) -> Vec<ScheduledTask> {
        self.step_progress(task).newly_scheduled
    }

    pub fn handle_completion(&mut self, task: TaskId, outcome: &TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    pub fn step_trigger(&mut self, task: TaskId) -> SchedulerStep {
        self.step_triggers(&[task])
    }

    pub fn step_progress(&mut self, task: TaskId) -> SchedulerStep {
        let Some(run_id) = self.active_run else {
            debug!(task = %task, "progress outside a run; ignoring");
            return SchedulerStep::default();
        };

        let mut manager = StateManager::new(&self.graph, &mut self.slots, run_id);
        if !manager.succeed(task) {
            warn!(task = %task, "progress from a task outside this pipeline; ignoring");
            return SchedulerStep::default();
        }
        debug!(task = %task, run_id, "long-lived task is up");

        let newly_scheduled = manager.take_ready();
        SchedulerStep {
            newly_scheduled,
            newly_failed: Vec::new(),
            run_just_finished: self.close_run_if_complete(),
        }
    }

    pub fn step_completion(&mut self, task: TaskId, outcome: &TaskOutcome) -> SchedulerStep {
        let Some(run_id) = self.active_run else {
            debug!(task = %task, "completion outside a run; ignoring");
            return SchedulerStep::default();
        };

        let mut manager = StateManager::new(&self.graph, &mut self.slots, run_id);
        let mut step = SchedulerStep::default();

        match outcome {
            TaskOutcome::Success => {
                if manager.succeed(task) {
                    debug!(task = %task, run_id, "task succeeded");
                    step.newly_scheduled = manager.take_ready();
                } else {
                    warn!(task = %task, "completion from a task outside this pipeline; ignoring");
                }
            }
            TaskOutcome::Failed(reason) | TaskOutcome::Fatal(reason) => {
                step.newly_failed = manager.fail(task);
                warn!(
                    task = %task,
                    run_id,
                    error = %reason,
                    skipped = ?step.newly_failed.get(1..),
                    "task failed; dependents skipped for this run"
                );
            }
        }

        step.run_just_finished = self.close_run_if_complete();
        step
    }

    fn step_triggers(&mut self, triggered: &[TaskId]) -> SchedulerStep {
        if triggered.is_empty() {
            return SchedulerStep::default();
        }

        let run_id = match self.active_run {
            Some(id) => id,
            None => {
                self.start_new_run();
                self.runs_started
            }
        };

        let mut manager = StateManager::new(&self.graph, &mut self.slots, run_id);
        for &task in triggered {
            if self.graph.contains(task) {
                manager.enroll_with_dependents(task);
            } else {
                warn!(task = %task, "trigger for a task outside this pipeline; ignoring");
            }
        }
        manager.enroll_missing_upstream();
        let newly_scheduled = manager.take_ready();

        SchedulerStep {
            newly_scheduled,
            newly_failed: Vec::new(),
            run_just_finished: self.close_run_if_complete(),
        }
    }

    /// Returns `true` if the active run closed here.
    fn close_run_if_complete(&mut self) -> bool {
        let Some(run_id) = self.active_run else {
            return false;
        };
        if self.slots.values().any(TaskSlot::is_unfinished) {
            return false;
        }
        info!(run_id, "run finished");
        self.active_run = None;
        true
    }
}
