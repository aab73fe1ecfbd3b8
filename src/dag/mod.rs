// src/dag/mod.rs

//! The build graph of a pipeline and the scheduler that walks it.

pub mod graph;
mod run_state;
pub mod scheduler;
mod state_manager;

pub use graph::BuildGraph;
pub use run_state::{ScheduledTask, SchedulerStep, TaskRunState};
pub use scheduler::Scheduler;
