// src/engine/mod.rs

//! The run loop.
//!
//! [`core::CoreRuntime`] is a synchronous state machine: it takes one
//! [`RuntimeEvent`] at a time and answers with [`CoreCommand`]s. The async
//! [`runtime::Runtime`] owns the event channel and the executor and does what
//! the core asks.

use crate::types::TaskId;

/// How a task execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// Dependents are skipped for this run; watching continues.
    Failed(String),
    /// Stops the runtime (the dev server could not bind).
    Fatal(String),
}

/// Where a trigger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Pipeline startup.
    Manual,
    /// A watched source file changed.
    FileWatch,
}

/// Knobs for embedding the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Return as soon as no run is active and nothing is queued.
    pub exit_when_idle: bool,
}

/// Everything the runtime reacts to.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    TaskTriggered { task: TaskId, reason: TriggerReason },
    /// A long-lived task is ready to be depended on.
    TaskProgressed { task: TaskId },
    TaskCompleted { task: TaskId, outcome: TaskOutcome },
    /// Ctrl-C.
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use crate::types::TriggerWhileRunningBehaviour;
pub use runtime::Runtime;
