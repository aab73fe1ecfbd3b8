// src/exec/task_runner.rs

//! One build task from start to `TaskCompleted`.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::PipelineError;
use crate::exec::ProgressReporter;
use crate::tasks::{BuildTask, TaskContext};

/// Run a single build task and emit its `TaskCompleted` event.
///
/// A failing task is logged and reported as `Failed`; only a dev server that
/// cannot start is reported as `Fatal`.
pub async fn run_task(
    task: ScheduledTask,
    build: Arc<dyn BuildTask>,
    ctx: Arc<TaskContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    info!(task = %task.id, run_id = task.run_id, "starting task");
    let started = Instant::now();

    let progress = ProgressReporter::new(task.id, runtime_tx.clone());
    let outcome = match build.execute(&ctx, progress).await {
        Ok(report) => {
            info!(
                task = %task.id,
                run_id = task.run_id,
                written = report.written.len(),
                unchanged = report.unchanged,
                failed = report.failed,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "task finished"
            );
            TaskOutcome::Success
        }
        Err(err) => outcome_for_error(&task, &err),
    };

    if runtime_tx
        .send(RuntimeEvent::TaskCompleted {
            task: task.id,
            outcome,
        })
        .await
        .is_err()
    {
        warn!(task = %task.id, "runtime gone; dropping completion event");
    }
}

fn outcome_for_error(task: &ScheduledTask, err: &anyhow::Error) -> TaskOutcome {
    let message = format!("{err:#}");
    error!(task = %task.id, run_id = task.run_id, error = %message, "task failed");

    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::ServerStart(_)) => TaskOutcome::Fatal(message),
        _ => TaskOutcome::Failed(message),
    }
}
