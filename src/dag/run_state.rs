// src/dag/run_state.rs

//! Per-task bookkeeping kept by the scheduler across runs.

use crate::types::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    /// Waiting for dependencies.
    Pending,
    /// Handed to the executor.
    Running,
    /// Finished, or a long-lived task that reported it is up.
    Succeeded,
    /// Failed itself, or an upstream task failed.
    Failed,
}

impl RunState {
    pub(crate) fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed)
    }
}

/// Where a task stands in the active run, as seen from outside the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    NotInRun,
    Pending,
    Running,
    DoneSuccess,
    DoneFailed,
}

impl TaskRunState {
    pub(crate) fn of(state: Option<RunState>) -> Self {
        match state {
            None => TaskRunState::NotInRun,
            Some(RunState::Pending) => TaskRunState::Pending,
            Some(RunState::Running) => TaskRunState::Running,
            Some(RunState::Succeeded) => TaskRunState::DoneSuccess,
            Some(RunState::Failed) => TaskRunState::DoneFailed,
        }
    }
}

/// One task of the pipeline: its direct dependencies, its state in the
/// active run (`None` when it is not part of it) and its history.
#[derive(Debug, Clone)]
pub(crate) struct TaskSlot {
    pub id: TaskId,
    pub deps: Vec<TaskId>,
    pub state: Option<RunState>,
    pub last_success: Option<u64>,
    pub last_failure: Option<u64>,
}

impl TaskSlot {
    pub fn new(id: TaskId, deps: Vec<TaskId>) -> Self {
        Self {
            id,
            deps,
            state: None,
            last_success: None,
            last_failure: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == Some(RunState::Pending)
    }

    /// Pending or running.
    pub fn is_unfinished(&self) -> bool {
        self.state.is_some_and(|s| !s.is_terminal())
    }

    pub fn has_history(&self) -> bool {
        self.last_success.is_some() || self.last_failure.is_some()
    }
}

/// A task the scheduler wants started now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub id: TaskId,
    pub long_lived: bool,
    /// Shared by every task dispatched within the same run.
    pub run_id: u64,
}

impl ScheduledTask {
    pub(crate) fn new(id: TaskId, run_id: u64) -> Self {
        Self {
            id,
            long_lived: id.is_long_lived(),
            run_id,
        }
    }
}

/// Everything one scheduler call changed, for callers that step the
/// scheduler by hand.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks to start now, in topological order.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// The failed task first, then every dependent failed along with it.
    pub newly_failed: Vec<TaskId>,
    /// The active run ended with this call.
    pub run_just_finished: bool,
}
