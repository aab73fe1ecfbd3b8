// src/tasks/copy.rs

//! Verbatim copies from the source tree into the output tree.

use std::path::PathBuf;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::PathConfig;
use crate::exec::ProgressReporter;
use crate::tasks::{BuildTask, FileEntry, FileSet, TaskContext, TaskFuture, TaskReport};
use crate::types::TaskId;

/// Copies a file set, preserving relative paths.
///
/// Files whose destination already has identical contents are left untouched,
/// so repeated runs do not bump modification times.
#[derive(Debug, Clone)]
pub struct CopyTask {
    id: TaskId,
    pattern: &'static str,
    source: fn(&PathConfig) -> PathBuf,
    output: fn(&PathConfig) -> PathBuf,
}

impl CopyTask {
    /// `js/**/*.js` -> `<output>/js/`.
    pub fn scripts() -> Self {
        Self {
            id: TaskId::ScriptCopy,
            pattern: "**/*.js",
            source: PathConfig::js_source,
            output: PathConfig::js_output,
        }
    }

    /// `fonts/**/*` -> `<output>/fonts/`.
    pub fn fonts() -> Self {
        Self {
            id: TaskId::FontCopy,
            pattern: "**/*",
            source: PathConfig::font_source,
            output: PathConfig::font_output,
        }
    }
}

impl BuildTask for CopyTask {
    fn id(&self) -> TaskId {
        self.id
    }

    fn execute<'a>(&'a self, ctx: &'a TaskContext, _progress: ProgressReporter) -> TaskFuture<'a> {
        Box::pin(async move {
            let paths = ctx.paths();
            let files = FileSet::resolve(&(self.source)(paths), self.pattern).await?;
            let out_dir = (self.output)(paths);

            let mut set = JoinSet::new();
            for entry in files {
                let dest = out_dir.join(&entry.relative);
                set.spawn(copy_one(entry, dest));
            }

            let mut report = TaskReport::default();
            while let Some(joined) = set.join_next().await {
                report.merge(joined??);
            }

            info!(
                task = %self.id,
                copied = report.written.len(),
                unchanged = report.unchanged,
                "copy finished"
            );
            Ok(report)
        })
    }
}

async fn copy_one(entry: FileEntry, dest: PathBuf) -> Result<TaskReport> {
    if crate::fs::same_contents(&entry.path, &dest).await? {
        debug!(file = ?dest, "destination up to date; skipping copy");
        return Ok(TaskReport {
            unchanged: 1,
            ..TaskReport::default()
        });
    }

    crate::fs::copy_file(&entry.path, &dest).await?;
    debug!(from = ?entry.path, to = ?dest, "copied file");
    Ok(TaskReport {
        written: vec![dest],
        ..TaskReport::default()
    })
}
