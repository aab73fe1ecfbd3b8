// src/engine/core.rs

//! The synchronous half of the runtime. No channels, no IO; every input is
//! a method call and every decision comes back as a [`CoreStep`].

use crate::dag::Scheduler;
use crate::engine::event_handlers::{
    handle_task_completion, handle_task_progress, handle_task_triggers, CoreStep,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{RuntimeEvent, RuntimeOptions};
use crate::types::{TaskId, TriggerWhileRunningBehaviour};

/// Scheduler plus the queue for triggers that arrive mid-run.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    queue: TriggerQueue,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(
        scheduler: Scheduler,
        behaviour: TriggerWhileRunningBehaviour,
        queue_length: usize,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            scheduler,
            queue: TriggerQueue::new(behaviour, queue_length),
            options,
        }
    }

    /// No active run and nothing queued for a next one.
    pub fn is_settled(&self) -> bool {
        self.scheduler.is_idle() && self.queue.is_empty()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Several `TaskTriggered` events received together.
    pub fn step_triggers(&mut self, tasks: Vec<TaskId>) -> CoreStep {
        handle_task_triggers(&mut self.scheduler, &mut self.queue, tasks)
    }

    /// Feed one event.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let Self {
            scheduler,
            queue,
            options,
        } = self;

        match event {
            RuntimeEvent::TaskTriggered { task, .. } => handle_task_triggers(scheduler, queue, vec![task]),
            RuntimeEvent::TaskProgressed { task } => handle_task_progress(scheduler, queue, options, task),
            RuntimeEvent::TaskCompleted { task, outcome } => {
                handle_task_completion(scheduler, queue, options, task, outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep::stop(),
        }
    }
}
