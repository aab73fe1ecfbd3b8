// src/watch/mod.rs

//! File watching for the watch pipeline.
//!
//! This module:
//! - holds the fixed table of watch bindings (pattern -> tasks);
//! - wires up a cross-platform filesystem watcher (`notify`);
//! - turns each changed path into task-level triggers.
//!
//! It does not schedule anything itself; dependency order is the scheduler's
//! job.

pub mod bindings;
pub mod event_handler;
pub mod path_utils;
pub mod watcher;

pub use bindings::{
    compile_bindings, standard_bindings, tasks_for_path, validate_binding_order,
    CompiledBinding, WatchBinding,
};
pub use watcher::{spawn_watcher, WatcherHandle};
