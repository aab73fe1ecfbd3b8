use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use assetflow::dag::ScheduledTask;
use assetflow::engine::{RuntimeEvent, TaskOutcome};
use assetflow::errors::PipelineError;
use assetflow::exec::{DispatchFuture, ExecutorBackend};
use assetflow::types::TaskId;
use tokio::sync::mpsc;

/// Executor that runs nothing.
///
/// Each dispatched task is appended to `executed` and answered at once:
/// `TaskProgressed` for the dev server, `TaskCompleted` for the rest, with
/// `Failed` for tasks registered through [`FakeExecutor::failing`].
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<TaskId>>>,
    failing: BTreeSet<TaskId>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, executed: Arc<Mutex<Vec<TaskId>>>) -> Self {
        Self {
            runtime_tx,
            executed,
            failing: BTreeSet::new(),
        }
    }

    pub fn failing(mut self, task: TaskId) -> Self {
        self.failing.insert(task);
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(&mut self, tasks: Vec<ScheduledTask>) -> DispatchFuture<'_> {
        let tx = self.runtime_tx.clone();
        let executed = Arc::clone(&self.executed);
        let failing = self.failing.clone();

        Box::pin(async move {
            for t in tasks {
                executed.lock().unwrap().push(t.id);

                let event = if failing.contains(&t.id) {
                    RuntimeEvent::TaskCompleted {
                        task: t.id,
                        outcome: TaskOutcome::Failed(format!("{} failed", t.id)),
                    }
                } else if t.long_lived {
                    RuntimeEvent::TaskProgressed { task: t.id }
                } else {
                    RuntimeEvent::TaskCompleted {
                        task: t.id,
                        outcome: TaskOutcome::Success,
                    }
                };

                tx.send(event)
                    .await
                    .map_err(|e| PipelineError::Other(anyhow::anyhow!("{e}")))?;
            }
            Ok(())
        })
    }
}
