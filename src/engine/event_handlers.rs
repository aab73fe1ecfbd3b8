// src/engine/event_handlers.rs

//! What the core does with each kind of event.

use std::collections::BTreeSet;

use crate::dag::{ScheduledTask, Scheduler, TaskRunState};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeOptions, TaskOutcome};
use crate::types::TaskId;

/// An instruction from the core to the async shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start these tasks.
    DispatchTasks(Vec<ScheduledTask>),
    /// Idle in `exit_when_idle` mode; the loop ends after this step.
    RequestExit,
    /// A fatal outcome; `run` returns it as an error.
    Abort { task: TaskId, reason: String },
}

/// The core's answer to one input.
#[derive(Debug, Clone, Default)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// `false` ends the runtime loop.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn stop() -> Self {
        Self::default()
    }

    fn carry_on() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    /// Queue a dispatch; an empty batch adds nothing.
    fn dispatch(&mut self, tasks: Vec<ScheduledTask>) {
        if !tasks.is_empty() {
            self.commands.push(CoreCommand::DispatchTasks(tasks));
        }
    }
}

/// Triggers for `tasks`.
///
/// With no active run they open one, together with whatever was queued.
/// During a run each task is looked at separately: one outside the run
/// joins it, a pending one needs nothing, and one that already started or
/// finished goes to the queue for the next run. A task therefore never has
/// two executions in flight.
pub fn handle_task_triggers(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    tasks: Vec<TaskId>,
) -> CoreStep {
    let mut step = CoreStep::carry_on();

    if scheduler.is_idle() {
        let seeds: BTreeSet<TaskId> = queue.drain_pending().into_iter().chain(tasks).collect();
        let seeds: Vec<TaskId> = seeds.into_iter().collect();
        step.dispatch(open_run(scheduler, &seeds));
        return step;
    }

    let mut joining = Vec::new();
    let mut held_back = Vec::new();
    for task in tasks {
        match scheduler.run_state_of(task) {
            Some(TaskRunState::NotInRun) => joining.push(task),
            // Outside the pipeline, or pending and yet to read its inputs.
            None | Some(TaskRunState::Pending) => {}
            Some(_) => held_back.push(task),
        }
    }
    queue.record_batch(&held_back);

    step.dispatch(scheduler.handle_triggers(&joining));
    step
}

/// A long-lived task came up.
pub fn handle_task_progress(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskId,
) -> CoreStep {
    let mut step = CoreStep::carry_on();
    step.dispatch(scheduler.handle_progress(task));
    after_settle(scheduler, queue, options, step)
}

/// A task finished.
pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    task: TaskId,
    outcome: TaskOutcome,
) -> CoreStep {
    let ready = scheduler.handle_completion(task, &outcome);

    if let TaskOutcome::Fatal(reason) = outcome {
        let mut step = CoreStep::stop();
        step.commands.push(CoreCommand::Abort { task, reason });
        return step;
    }

    let mut step = CoreStep::carry_on();
    step.dispatch(ready);
    after_settle(scheduler, queue, options, step)
}

/// Open a run seeded with `seeds`; returns what is ready right away.
fn open_run(scheduler: &mut Scheduler, seeds: &[TaskId]) -> Vec<ScheduledTask> {
    if seeds.is_empty() {
        return Vec::new();
    }
    scheduler.start_new_run();
    scheduler.handle_triggers(seeds)
}

/// Start the queued follow-up run if the last one just closed, then decide
/// whether an `exit_when_idle` runtime is done.
fn after_settle(
    scheduler: &mut Scheduler,
    queue: &mut TriggerQueue,
    options: &RuntimeOptions,
    mut step: CoreStep,
) -> CoreStep {
    if scheduler.is_idle() {
        let queued = queue.drain_pending();
        step.dispatch(open_run(scheduler, &queued));
    }

    if options.exit_when_idle && scheduler.is_idle() && queue.is_empty() {
        step.commands.push(CoreCommand::RequestExit);
        step.keep_running = false;
    }
    step
}
