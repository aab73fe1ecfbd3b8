// src/pipeline.rs

//! The two entry points: a one-shot build and the watch loop.

use crate::cli::Command;
use crate::dag::BuildGraph;
use crate::errors::Result;
use crate::types::TaskId;

/// Which tasks run, and whether sources are watched afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Serve, compile stylesheets, bundle and copy fonts. Scripts are not
    /// copied here; only the watch pipeline copies them.
    Default,
    /// Every task, then re-run affected tasks on source changes.
    Watch,
}

const DEFAULT_TASKS: &[TaskId] = &[
    TaskId::DevServer,
    TaskId::StylesheetCompile,
    TaskId::AssetBundle,
    TaskId::FontCopy,
];

impl Pipeline {
    pub fn name(self) -> &'static str {
        match self {
            Pipeline::Default => "build",
            Pipeline::Watch => "watch",
        }
    }

    /// Tasks in this pipeline, in startup trigger order.
    pub fn tasks(self) -> &'static [TaskId] {
        match self {
            Pipeline::Default => DEFAULT_TASKS,
            Pipeline::Watch => &TaskId::ALL,
        }
    }

    pub fn watches(self) -> bool {
        matches!(self, Pipeline::Watch)
    }

    pub fn graph(self) -> Result<BuildGraph> {
        BuildGraph::for_tasks(self.tasks())
    }
}

impl From<Command> for Pipeline {
    fn from(command: Command) -> Self {
        match command {
            Command::Build => Pipeline::Default,
            Command::Watch => Pipeline::Watch,
        }
    }
}
