// tests/build_graph.rs

use assetflow::dag::{BuildGraph, Scheduler, TaskRunState};
use assetflow::engine::TaskOutcome;
use assetflow::errors::PipelineError;
use assetflow::pipeline::Pipeline;
use assetflow::types::TaskId;
use assetflow_test_utils::init_tracing;

fn ids(scheduled: Vec<assetflow::dag::ScheduledTask>) -> Vec<TaskId> {
    scheduled.into_iter().map(|t| t.id).collect()
}

#[test]
fn bundle_runs_after_stylesheets_and_scripts() {
    init_tracing();

    let graph = Pipeline::Watch.graph().unwrap();
    let order = graph.topological_order();

    let rank = |t: TaskId| order.iter().position(|x| *x == t).unwrap();
    assert!(rank(TaskId::StylesheetCompile) < rank(TaskId::AssetBundle));
    assert!(rank(TaskId::ScriptCopy) < rank(TaskId::AssetBundle));
    assert_eq!(order.len(), 5);

    assert_eq!(
        graph.dependencies_of(TaskId::AssetBundle),
        &[TaskId::StylesheetCompile, TaskId::ScriptCopy]
    );
    assert!(graph.dependencies_of(TaskId::DevServer).is_empty());
    assert!(graph.dependencies_of(TaskId::FontCopy).is_empty());
}

#[test]
fn default_pipeline_graph_has_no_script_copy() {
    let graph = Pipeline::Default.graph().unwrap();
    assert!(!graph.contains(TaskId::ScriptCopy));
    assert_eq!(
        graph.dependencies_of(TaskId::AssetBundle),
        &[TaskId::StylesheetCompile]
    );
}

#[test]
fn cyclic_edges_are_rejected() {
    let err = BuildGraph::with_edges(
        &[TaskId::StylesheetCompile, TaskId::AssetBundle],
        &[
            (TaskId::StylesheetCompile, TaskId::AssetBundle),
            (TaskId::AssetBundle, TaskId::StylesheetCompile),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::DagCycle(_)), "got {err:?}");
}

/// Bring every task to a successful first run so history is populated.
fn warmed_up_scheduler() -> Scheduler {
    let mut scheduler = Scheduler::new(Pipeline::Watch.graph().unwrap());
    let mut pending: Vec<TaskId> = Vec::new();
    for task in TaskId::ALL {
        pending.extend(ids(scheduler.handle_trigger(task)));
    }
    while let Some(task) = pending.pop() {
        let next = if task.is_long_lived() {
            scheduler.handle_progress(task)
        } else {
            scheduler.handle_completion(task, &TaskOutcome::Success)
        };
        pending.extend(ids(next));
    }
    assert!(scheduler.is_idle());
    scheduler
}

#[test]
fn stylesheet_change_runs_stylesheets_then_bundle() {
    init_tracing();
    let mut scheduler = warmed_up_scheduler();

    let first = ids(scheduler.handle_trigger(TaskId::StylesheetCompile));
    assert_eq!(first, vec![TaskId::StylesheetCompile]);
    assert_eq!(
        scheduler.run_state_of(TaskId::AssetBundle),
        Some(TaskRunState::Pending)
    );
    // The bundle is already pending; the second binding trigger adds nothing.
    assert!(ids(scheduler.handle_trigger(TaskId::AssetBundle)).is_empty());

    let second = ids(scheduler.handle_completion(TaskId::StylesheetCompile, &TaskOutcome::Success));
    assert_eq!(second, vec![TaskId::AssetBundle]);

    assert!(ids(scheduler.handle_completion(TaskId::AssetBundle, &TaskOutcome::Success)).is_empty());
    assert!(scheduler.is_idle());
}

#[test]
fn html_change_runs_only_bundle_once_upstream_has_succeeded() {
    let mut scheduler = warmed_up_scheduler();

    let first = ids(scheduler.handle_trigger(TaskId::AssetBundle));
    assert_eq!(first, vec![TaskId::AssetBundle]);
    assert_eq!(
        scheduler.run_state_of(TaskId::StylesheetCompile),
        Some(TaskRunState::NotInRun)
    );
    assert_eq!(scheduler.tasks_in_current_run(), vec![TaskId::AssetBundle]);
}

#[test]
fn font_change_runs_only_fonts() {
    let mut scheduler = warmed_up_scheduler();

    assert_eq!(ids(scheduler.handle_trigger(TaskId::FontCopy)), vec![TaskId::FontCopy]);
    assert_eq!(scheduler.tasks_in_current_run(), vec![TaskId::FontCopy]);
    assert!(ids(scheduler.handle_completion(TaskId::FontCopy, &TaskOutcome::Success)).is_empty());
    assert!(scheduler.is_idle());
}

#[test]
fn bundle_trigger_pulls_in_upstream_that_never_succeeded() {
    init_tracing();
    let mut scheduler = Scheduler::new(Pipeline::Watch.graph().unwrap());

    let mut first = ids(scheduler.handle_trigger(TaskId::AssetBundle));
    first.sort();
    assert_eq!(first, vec![TaskId::StylesheetCompile, TaskId::ScriptCopy]);
    assert_eq!(
        scheduler.run_state_of(TaskId::AssetBundle),
        Some(TaskRunState::Pending)
    );

    assert!(ids(scheduler.handle_completion(TaskId::StylesheetCompile, &TaskOutcome::Success)).is_empty());
    let ready = ids(scheduler.handle_completion(TaskId::ScriptCopy, &TaskOutcome::Success));
    assert_eq!(ready, vec![TaskId::AssetBundle]);
}

#[test]
fn failed_stylesheets_fail_pending_bundle() {
    let mut scheduler = warmed_up_scheduler();

    scheduler.handle_trigger(TaskId::StylesheetCompile);
    let step = scheduler.step_completion(
        TaskId::StylesheetCompile,
        &TaskOutcome::Failed("boom".to_string()),
    );

    assert!(step.newly_scheduled.is_empty());
    assert_eq!(step.newly_failed, vec![TaskId::StylesheetCompile, TaskId::AssetBundle]);
    assert!(step.run_just_finished);
    assert!(scheduler.is_idle());
}

#[test]
fn dev_server_progress_counts_as_success() {
    let mut scheduler = Scheduler::new(Pipeline::Default.graph().unwrap());

    assert_eq!(ids(scheduler.handle_trigger(TaskId::DevServer)), vec![TaskId::DevServer]);
    assert!(!scheduler.is_idle());

    scheduler.handle_progress(TaskId::DevServer);
    assert_eq!(
        scheduler.run_state_of(TaskId::DevServer),
        Some(TaskRunState::DoneSuccess)
    );
    assert!(scheduler.is_idle());
}

#[test]
fn trigger_for_task_outside_pipeline_is_ignored() {
    let mut scheduler = Scheduler::new(Pipeline::Default.graph().unwrap());

    assert!(ids(scheduler.handle_trigger(TaskId::ScriptCopy)).is_empty());
    assert_eq!(scheduler.run_state_of(TaskId::ScriptCopy), None);
    assert!(scheduler.is_idle());
}
