// src/exec/mod.rs

//! Running dispatched tasks and reporting their outcome back to the runtime.

pub mod backend;
pub mod executor_loop;
pub mod progress;
pub mod task_runner;

pub use backend::{DispatchFuture, ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
pub use progress::ProgressReporter;
