// src/exec/progress.rs

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::RuntimeEvent;
use crate::types::TaskId;

/// Handle given to every task execution so a long-lived task can signal that
/// it is ready (the dev server once its socket is bound).
///
/// Short tasks simply ignore it; their completion is what the scheduler waits
/// for.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    task: TaskId,
    runtime_tx: Option<mpsc::Sender<RuntimeEvent>>,
}

impl ProgressReporter {
    pub fn new(task: TaskId, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            task,
            runtime_tx: Some(runtime_tx),
        }
    }

    /// A reporter that goes nowhere, for running a task outside the runtime.
    pub fn detached(task: TaskId) -> Self {
        Self {
            task,
            runtime_tx: None,
        }
    }

    /// Emit `TaskProgressed` for this task.
    pub async fn report(&self) {
        let Some(tx) = &self.runtime_tx else {
            return;
        };
        if tx
            .send(RuntimeEvent::TaskProgressed { task: self.task })
            .await
            .is_err()
        {
            debug!(task = %self.task, "runtime gone; dropping progress event");
        }
    }
}
