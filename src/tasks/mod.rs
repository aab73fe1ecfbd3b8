// src/tasks/mod.rs

//! The build tasks themselves.
//!
//! Each task implements [`BuildTask`] and is looked up by [`TaskId`] through a
//! [`TaskRegistry`]. Tasks share a read-only [`TaskContext`] holding the
//! configuration, the reload hub and the error notifier.

pub mod bundle;
pub mod copy;
pub mod fileset;
pub mod minify;
pub mod notifier;
pub mod stylesheet;
pub mod useref;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::{ConfigFile, PathConfig};
use crate::exec::ProgressReporter;
use crate::server::{DevServer, ReloadHub};
use crate::types::TaskId;

pub use bundle::AssetBundle;
pub use copy::CopyTask;
pub use fileset::{FileEntry, FileSet};
pub use notifier::{LogNotifier, Notification, Notifier};
pub use stylesheet::StylesheetCompile;

/// Future returned by [`BuildTask::execute`].
pub type TaskFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<TaskReport>> + Send + 'a>>;

/// A unit of work the executor can run.
pub trait BuildTask: Send + Sync {
    fn id(&self) -> TaskId;

    /// Run the task once.
    ///
    /// Long-lived tasks call `progress.report()` when ready and only return
    /// when they stop.
    fn execute<'a>(&'a self, ctx: &'a TaskContext, progress: ProgressReporter) -> TaskFuture<'a>;
}

/// What a finished task did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    /// Files written during this execution.
    pub written: Vec<PathBuf>,
    /// Files left alone because the output was already up to date.
    pub unchanged: usize,
    /// Inputs that failed without failing the task (stylesheet compile errors).
    pub failed: usize,
}

impl TaskReport {
    pub fn merge(&mut self, other: TaskReport) {
        self.written.extend(other.written);
        self.unchanged += other.unchanged;
        self.failed += other.failed;
    }
}

/// Shared state handed to every task execution.
pub struct TaskContext {
    config: Arc<ConfigFile>,
    reload: ReloadHub,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("config", &self.config)
            .field("reload", &self.reload)
            .finish_non_exhaustive()
    }
}

impl TaskContext {
    pub fn new(config: Arc<ConfigFile>, reload: ReloadHub, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            reload,
            notifier,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn paths(&self) -> &PathConfig {
        self.config.paths()
    }

    pub fn reload(&self) -> &ReloadHub {
        &self.reload
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }
}

/// Lookup table from task identity to implementation.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskId, Arc<dyn BuildTask>>,
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tasks.keys()).finish()
    }
}

impl TaskRegistry {
    /// Registry with the real implementation of every task.
    pub fn standard() -> Self {
        Self::default()
            .with_task(Arc::new(DevServer))
            .with_task(Arc::new(StylesheetCompile))
            .with_task(Arc::new(AssetBundle))
            .with_task(Arc::new(CopyTask::scripts()))
            .with_task(Arc::new(CopyTask::fonts()))
    }

    /// Register (or replace) the implementation for `task.id()`.
    pub fn with_task(mut self, task: Arc<dyn BuildTask>) -> Self {
        self.tasks.insert(task.id(), task);
        self
    }

    pub fn get(&self, id: TaskId) -> Option<Arc<dyn BuildTask>> {
        self.tasks.get(&id).cloned()
    }
}
