// src/tasks/stylesheet.rs

//! Sass compilation: every top-level `sass/*.scss` becomes `css/*.css`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::exec::ProgressReporter;
use crate::tasks::notifier::{Notification, Notifier};
use crate::tasks::{BuildTask, FileEntry, FileSet, TaskContext, TaskFuture, TaskReport};
use crate::types::TaskId;

const SOURCE_PATTERN: &str = "*.scss";

/// Compiles stylesheets with `grass`.
///
/// A stylesheet that fails to compile is reported through the notifier and
/// skipped; the task itself still succeeds so the watch loop survives typos.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesheetCompile;

impl BuildTask for StylesheetCompile {
    fn id(&self) -> TaskId {
        TaskId::StylesheetCompile
    }

    fn execute<'a>(&'a self, ctx: &'a TaskContext, _progress: ProgressReporter) -> TaskFuture<'a> {
        Box::pin(async move {
            let paths = ctx.paths();
            let sources = FileSet::resolve(&paths.sass_source(), SOURCE_PATTERN).await?;
            let out_dir = paths.css_output();
            let shared_load_paths = vec![paths.sass_source(), paths.dependency_dir.clone()];

            let mut set = JoinSet::new();
            for entry in sources {
                if is_partial(&entry) {
                    debug!(file = ?entry.path, "skipping partial");
                    continue;
                }
                let out_path = css_output_path(&out_dir, &entry);
                let load_paths = shared_load_paths.clone();
                let notifier = Arc::clone(ctx.notifier());
                set.spawn(compile_one(entry, out_path, load_paths, notifier));
            }

            let mut report = TaskReport::default();
            while let Some(joined) = set.join_next().await {
                report.merge(joined??);
            }

            info!(
                compiled = report.written.len(),
                failed = report.failed,
                "stylesheets compiled"
            );
            Ok(report)
        })
    }
}

/// Files whose name starts with `_` are only meant to be imported.
fn is_partial(entry: &FileEntry) -> bool {
    entry.file_name().is_some_and(|n| n.starts_with('_'))
}

fn css_output_path(out_dir: &Path, entry: &FileEntry) -> PathBuf {
    out_dir.join(entry.relative.with_extension("css"))
}

async fn compile_one(
    entry: FileEntry,
    out_path: PathBuf,
    mut load_paths: Vec<PathBuf>,
    notifier: Arc<dyn Notifier>,
) -> Result<TaskReport> {
    let source = crate::fs::read_to_string(&entry.path).await?;
    if let Some(dir) = entry.path.parent() {
        load_paths.insert(0, dir.to_path_buf());
    }

    let compiled = tokio::task::spawn_blocking(move || compile_scss(source, &load_paths)).await?;
    match compiled {
        Ok(css) => {
            crate::fs::write_file(&out_path, css).await?;
            debug!(from = ?entry.path, to = ?out_path, "compiled stylesheet");
            Ok(TaskReport {
                written: vec![out_path],
                ..TaskReport::default()
            })
        }
        Err(message) => {
            notifier.notify(Notification::new("Sass compile error", message).with_path(&entry.path));
            Ok(TaskReport {
                failed: 1,
                ..TaskReport::default()
            })
        }
    }
}

/// Compile SCSS source to CSS, resolving imports against `load_paths`.
pub fn compile_scss(source: String, load_paths: &[PathBuf]) -> std::result::Result<String, String> {
    let options = grass::Options::default().load_paths(load_paths);
    grass::from_string(source, &options).map_err(|e| e.to_string())
}
