// src/tasks/bundle.rs

//! Reference-block bundling: top-level `*.html` in, rewritten HTML plus
//! concatenated and minified bundles out.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::config::PathConfig;
use crate::errors::PipelineError;
use crate::exec::ProgressReporter;
use crate::tasks::minify::minify_asset;
use crate::tasks::useref::{normalize_reference, rewrite_html, BlockKind, ReferenceBlock, ReferenceParser};
use crate::tasks::{BuildTask, FileEntry, FileSet, TaskContext, TaskFuture, TaskReport};
use crate::types::TaskId;

const HTML_PATTERN: &str = "*.html";

/// Separator placed between concatenated assets.
pub const CONCAT_SEPARATOR: &str = "\n";

/// Bundles the assets named in HTML reference blocks.
///
/// Any reference, read or minify error fails the task. Once every document
/// has been written a single reload signal is broadcast.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetBundle;

impl BuildTask for AssetBundle {
    fn id(&self) -> TaskId {
        TaskId::AssetBundle
    }

    fn execute<'a>(&'a self, ctx: &'a TaskContext, _progress: ProgressReporter) -> TaskFuture<'a> {
        Box::pin(async move {
            let paths = Arc::new(ctx.paths().clone());
            let parser = Arc::new(ReferenceParser::new()?);
            let documents = FileSet::resolve(&paths.source_root, HTML_PATTERN).await?;

            let mut set = JoinSet::new();
            for entry in documents {
                set.spawn(bundle_document(entry, Arc::clone(&paths), Arc::clone(&parser)));
            }

            let mut report = TaskReport::default();
            let mut first_error = None;
            while let Some(joined) = set.join_next().await {
                match joined? {
                    Ok(r) => report.merge(r),
                    Err(e) if first_error.is_none() => first_error = Some(e),
                    Err(e) => debug!(error = %format!("{e:#}"), "additional bundle failure"),
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }

            report.written.sort();
            let listeners = ctx.reload().reload(report.written.clone());
            info!(
                written = report.written.len(),
                listeners,
                "bundles written; reload signalled"
            );
            Ok(report)
        })
    }
}

/// Rewrite one HTML document and write its bundles.
async fn bundle_document(
    entry: FileEntry,
    paths: Arc<PathConfig>,
    parser: Arc<ReferenceParser>,
) -> Result<TaskReport> {
    let html = crate::fs::read_to_string(&entry.path).await?;
    let blocks = parser
        .parse_blocks(&html)
        .map_err(|message| reference_error(&entry.path, message))?;

    let html_dir = entry.path.parent().unwrap_or(Path::new(".")).to_path_buf();
    let mut report = TaskReport::default();

    for block in &blocks {
        let Some(output) = block_output(block) else {
            continue;
        };
        let contents = concat_assets(&entry.path, &html_dir, block, &paths).await?;

        let out_path = paths.output_root.join(bundle_target(&entry.path, output)?);
        let minified = {
            let out_path = out_path.clone();
            tokio::task::spawn_blocking(move || minify_asset(&out_path, &contents)).await??
        };
        crate::fs::write_file(&out_path, minified).await?;
        debug!(html = ?entry.path, bundle = ?out_path, assets = block.assets.len(), "wrote bundle");
        report.written.push(out_path);
    }

    let rewritten = rewrite_html(&html, &blocks);
    let html_out = paths.output_root.join(&entry.relative);
    crate::fs::write_file(&html_out, rewritten).await?;
    report.written.push(html_out);

    Ok(report)
}

/// The bundle path of a block, relative to the output root. Paths that
/// would climb out of the output root are rejected.
fn bundle_target<'a>(html_path: &Path, output: &'a str) -> Result<&'a Path> {
    let target = Path::new(normalize_reference(output));
    let escapes = target
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes || target.as_os_str().is_empty() {
        return Err(reference_error(
            html_path,
            format!("bundle output '{output}' must be a path inside the output root"),
        ));
    }
    Ok(target)
}

fn block_output(block: &ReferenceBlock) -> Option<&str> {
    match block.kind {
        BlockKind::Js | BlockKind::Css => block.output.as_deref(),
        BlockKind::Remove => None,
    }
}

/// Read every asset of `block` in order and join them.
async fn concat_assets(
    html_path: &Path,
    html_dir: &Path,
    block: &ReferenceBlock,
    paths: &PathConfig,
) -> Result<String> {
    let search_dirs = search_dirs(block, html_dir, paths);
    let mut parts = Vec::with_capacity(block.assets.len());

    for reference in &block.assets {
        let asset = resolve_asset(reference, &search_dirs).await.ok_or_else(|| {
            reference_error(
                html_path,
                format!("asset '{reference}' not found (searched {search_dirs:?})"),
            )
        })?;
        parts.push(crate::fs::read_to_string(&asset).await?);
    }

    Ok(parts.join(CONCAT_SEPARATOR))
}

/// Directories an asset reference is looked up in, most specific first.
pub fn search_dirs(block: &ReferenceBlock, html_dir: &Path, paths: &PathConfig) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = block.search_paths.iter().map(PathBuf::from).collect();
    dirs.push(html_dir.to_path_buf());
    dirs.push(paths.output_root.clone());
    dirs.push(paths.dependency_dir.clone());
    dirs
}

/// First existing file for `reference` among `dirs`.
pub async fn resolve_asset(reference: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let relative = normalize_reference(reference);
    if relative.is_empty() {
        return None;
    }
    for dir in dirs {
        let candidate = dir.join(relative);
        if tokio::fs::metadata(&candidate)
            .await
            .is_ok_and(|m| m.is_file())
        {
            return Some(candidate);
        }
    }
    None
}

fn reference_error(file: &Path, message: String) -> anyhow::Error {
    PipelineError::Reference {
        file: file.to_path_buf(),
        message,
    }
    .into()
}
