// src/exec/backend.rs

//! The seam between the runtime and whatever actually runs tasks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::{PipelineError, Result};
use crate::tasks::{TaskContext, TaskRegistry};

use super::executor_loop::spawn_executor;

/// Future returned by [`ExecutorBackend::spawn_ready_tasks`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Accepts tasks the scheduler has marked ready.
///
/// Implementations must eventually answer every dispatched task with a
/// `TaskCompleted` (or, for long-lived tasks, `TaskProgressed`) event on the
/// runtime channel. Dispatch itself only hands the tasks over.
pub trait ExecutorBackend: Send {
    fn spawn_ready_tasks(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_>;
}

/// Hands tasks to the background loop started by [`spawn_executor`], which
/// looks them up in a [`TaskRegistry`] and runs them.
pub struct RealExecutorBackend {
    tx: mpsc::Sender<ScheduledTask>,
}

impl RealExecutorBackend {
    /// Starts the executor loop right away.
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        registry: TaskRegistry,
        ctx: Arc<TaskContext>,
    ) -> Self {
        Self {
            tx: spawn_executor(runtime_tx, registry, ctx),
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_ready_tasks(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_> {
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                tx.send(task).await.map_err(|e| {
                    PipelineError::Other(anyhow::anyhow!("executor loop closed: {e}"))
                })?;
            }
            Ok(())
        })
    }
}
