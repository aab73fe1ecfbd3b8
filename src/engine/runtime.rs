// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, error, info};

use crate::dag::ScheduledTask;
use crate::errors::{PipelineError, Result};
use crate::exec::ExecutorBackend;
use crate::types::TaskId;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the scheduler in response to `RuntimeEvent`s, and delegates task
/// execution to an `ExecutorBackend`.
///
/// All semantics live in `CoreRuntime`; this struct only moves events and
/// commands between channels and the executor.
///
/// Triggers that are already waiting in the channel are handed to the core as
/// one batch (the startup triggers, or the two triggers of one saved
/// stylesheet).
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    /// First non-trigger event seen while draining a trigger batch.
    stashed: Option<RuntimeEvent>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
            stashed: None,
        }
    }

    /// Main event loop.
    ///
    /// Returns `Ok` on shutdown, on a closed event channel, or when the core
    /// asks to exit; returns the fatal error if a task aborted the pipeline.
    pub async fn run(mut self) -> Result<()> {
        info!("assetflow runtime started");

        loop {
            let event = match self.next_event().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            let step = match event {
                RuntimeEvent::TaskTriggered { task, reason } => {
                    let batch = self.drain_ready_triggers(task);
                    debug!(tasks = ?batch, ?reason, "runtime received triggers");
                    self.core.step_triggers(batch)
                }
                other => {
                    debug!(event = ?other, "runtime received event");
                    self.core.step(other)
                }
            };

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn next_event(&mut self) -> Option<RuntimeEvent> {
        if let Some(event) = self.stashed.take() {
            return Some(event);
        }
        self.event_rx.recv().await
    }

    /// Collect `first` plus every trigger already queued behind it.
    fn drain_ready_triggers(&mut self, first: TaskId) -> Vec<TaskId> {
        let mut batch = vec![first];
        loop {
            match self.event_rx.try_recv() {
                Ok(RuntimeEvent::TaskTriggered { task, .. }) => batch.push(task),
                Ok(other) => {
                    self.stashed = Some(other);
                    break;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        batch
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchTasks(tasks) => self.spawn_ready(tasks).await,
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
                Ok(())
            }
            CoreCommand::Abort { task, reason } => {
                error!(task = %task, error = %reason, "fatal task failure; aborting");
                Err(PipelineError::ServerStart(reason))
            }
        }
    }

    async fn spawn_ready(&mut self, tasks: Vec<ScheduledTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        debug!(?ids, "spawning ready tasks");

        self.executor.spawn_ready_tasks(tasks).await
    }
}
