// src/exec/executor_loop.rs

//! Background loop that turns scheduled tasks into tokio tasks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::exec::task_runner::run_task;
use crate::tasks::{TaskContext, TaskRegistry};
use crate::types::TaskId;

/// Start the loop; `RealExecutorBackend` feeds it through the returned sender.
///
/// A long-lived task (the dev server) is never started twice: if an instance
/// is still running when the task is scheduled again, a `TaskProgressed` is
/// synthesized so the new run treats it as up.
pub fn spawn_executor(
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    registry: TaskRegistry,
    ctx: Arc<TaskContext>,
) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        let mut active: HashMap<TaskId, JoinHandle<()>> = HashMap::new();

        while let Some(task) = rx.recv().await {
            handle_scheduled_task(task, &mut active, &registry, &ctx, &runtime_tx).await;
        }

        info!("executor loop stopped: no more dispatches");
    });

    tx
}

async fn handle_scheduled_task(
    task: ScheduledTask,
    active: &mut HashMap<TaskId, JoinHandle<()>>,
    registry: &TaskRegistry,
    ctx: &Arc<TaskContext>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) {
    if let Some(existing) = active.get(&task.id) {
        if !existing.is_finished() {
            if task.long_lived {
                debug!(
                    task = %task.id,
                    run_id = task.run_id,
                    "long-lived task already running; synthesizing progress event"
                );
                let _ = runtime_tx
                    .send(RuntimeEvent::TaskProgressed { task: task.id })
                    .await;
                return;
            }
            // The previous instance already reported completion and is only
            // unwinding; the scheduler never overlaps runs of a short task.
            debug!(
                task = %task.id,
                run_id = task.run_id,
                "previous instance still unwinding; starting new instance"
            );
        }
    }

    let Some(build) = registry.get(task.id) else {
        warn!(task = %task.id, "no implementation registered for task");
        let _ = runtime_tx
            .send(RuntimeEvent::TaskCompleted {
                task: task.id,
                outcome: TaskOutcome::Failed(format!("no implementation registered for '{}'", task.id)),
            })
            .await;
        return;
    };

    let rt_tx = runtime_tx.clone();
    let ctx = Arc::clone(ctx);
    let handle = tokio::spawn(async move {
        run_task(task, build, ctx, rt_tx).await;
        debug!(task = %task.id, "task runner future finished");
    });

    active.insert(task.id, handle);
}
