// tests/scheduler_properties.rs

use std::collections::BTreeSet;

use proptest::prelude::*;

use assetflow::dag::{Scheduler, TaskRunState};
use assetflow::engine::TaskOutcome;
use assetflow::pipeline::Pipeline;
use assetflow::types::TaskId;

fn task_strategy() -> impl Strategy<Value = TaskId> {
    proptest::sample::select(TaskId::ALL.to_vec())
}

fn pipeline_strategy() -> impl Strategy<Value = Pipeline> {
    prop_oneof![Just(Pipeline::Default), Just(Pipeline::Watch)]
}

proptest! {
    #[test]
    fn runs_terminate_and_respect_dependencies(
        pipeline in pipeline_strategy(),
        triggers in proptest::collection::vec(task_strategy(), 1..6),
        failing in proptest::collection::btree_set(task_strategy(), 0..3),
    ) {
        let mut scheduler = Scheduler::new(pipeline.graph().unwrap());
        let graph = scheduler.graph().clone();

        let mut executing: Vec<TaskId> = Vec::new();
        for t in &triggers {
            executing.extend(scheduler.handle_trigger(*t).into_iter().map(|st| st.id));
        }

        let mut dispatched: Vec<TaskId> = executing.clone();
        let mut succeeded: BTreeSet<TaskId> = BTreeSet::new();
        let mut steps = 0;

        while !scheduler.is_idle() && steps < 100 {
            steps += 1;

            if executing.is_empty() {
                for t in scheduler.tasks_in_current_run() {
                    if scheduler.run_state_of(t) == Some(TaskRunState::Pending) {
                        let satisfied = scheduler.deps_satisfied(t).unwrap_or(false);
                        prop_assert!(!satisfied, "{t} is pending with satisfied deps but was never scheduled");
                    }
                }
                prop_assert!(false, "run is stuck with nothing executing");
            }

            let task = executing.remove(0);
            let ready = if failing.contains(&task) {
                scheduler.handle_completion(task, &TaskOutcome::Failed(format!("{task} failed")))
            } else {
                succeeded.insert(task);
                if task.is_long_lived() {
                    scheduler.handle_progress(task)
                } else {
                    scheduler.handle_completion(task, &TaskOutcome::Success)
                }
            };

            for st in ready {
                for dep in graph.dependencies_of(st.id) {
                    prop_assert!(
                        succeeded.contains(dep) || !dispatched.contains(dep),
                        "{} dispatched before its dependency {dep} succeeded", st.id
                    );
                }
                dispatched.push(st.id);
                executing.push(st.id);
            }
        }

        prop_assert!(scheduler.is_idle(), "run did not finish within {steps} steps");

        let unique: BTreeSet<TaskId> = dispatched.iter().copied().collect();
        prop_assert_eq!(unique.len(), dispatched.len(), "a task ran twice in one run: {:?}", dispatched);

        for task in &dispatched {
            prop_assert!(graph.contains(*task), "{task} is not part of {}", pipeline.name());
            for dep in graph.dependencies_of(*task) {
                prop_assert!(!failing.contains(dep) || !dispatched.contains(dep),
                    "{task} ran although {dep} failed");
            }
        }
    }
}
