// src/watch/bindings.rs

//! The table mapping source-file patterns to the tasks they trigger.

use std::fmt;

use anyhow::{bail, Result};
use globset::GlobMatcher;

use crate::config::PathConfig;
use crate::dag::BuildGraph;
use crate::tasks::fileset::compile_glob;
use crate::types::TaskId;
use crate::watch::path_utils::glob_prefix;

/// One watch rule: a glob relative to the source root and the tasks a
/// matching change triggers, in the order they are triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchBinding {
    pub pattern: String,
    pub tasks: Vec<TaskId>,
}

impl WatchBinding {
    pub fn new(pattern: impl Into<String>, tasks: &[TaskId]) -> Self {
        Self {
            pattern: pattern.into(),
            tasks: tasks.to_vec(),
        }
    }
}

/// The fixed binding table for a given layout:
///
/// | pattern            | tasks                               |
/// |--------------------|-------------------------------------|
/// | `sass/**/*.scss`   | stylesheets, bundle                 |
/// | `js/**/*.js`       | scripts, bundle                     |
/// | `*.html`           | bundle                              |
/// | `fonts/**/*`       | fonts                               |
pub fn standard_bindings(paths: &PathConfig) -> Vec<WatchBinding> {
    let under = |dir: &std::path::Path, tail: &str| {
        let prefix = glob_prefix(dir);
        if prefix.is_empty() {
            tail.to_string()
        } else {
            format!("{prefix}/{tail}")
        }
    };

    vec![
        WatchBinding::new(
            under(&paths.sass_dir, "**/*.scss"),
            &[TaskId::StylesheetCompile, TaskId::AssetBundle],
        ),
        WatchBinding::new(
            under(&paths.js_dir, "**/*.js"),
            &[TaskId::ScriptCopy, TaskId::AssetBundle],
        ),
        WatchBinding::new("*.html", &[TaskId::AssetBundle]),
        WatchBinding::new(under(&paths.font_dir, "**/*"), &[TaskId::FontCopy]),
    ]
}

/// A binding with its glob compiled.
#[derive(Clone)]
pub struct CompiledBinding {
    pattern: String,
    matcher: GlobMatcher,
    tasks: Vec<TaskId>,
}

impl fmt::Debug for CompiledBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledBinding")
            .field("pattern", &self.pattern)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl CompiledBinding {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    /// `rel` is relative to the source root, with forward slashes.
    pub fn matches(&self, rel: &str) -> bool {
        self.matcher.is_match(rel)
    }
}

/// Compile every binding's glob.
pub fn compile_bindings(bindings: &[WatchBinding]) -> Result<Vec<CompiledBinding>> {
    bindings
        .iter()
        .map(|b| {
            Ok(CompiledBinding {
                pattern: b.pattern.clone(),
                matcher: compile_glob(&b.pattern)?,
                tasks: b.tasks.clone(),
            })
        })
        .collect()
}

/// Tasks triggered by a change at `rel`: every matching binding's tasks in
/// declared order, without duplicates.
pub fn tasks_for_path(bindings: &[CompiledBinding], rel: &str) -> Vec<TaskId> {
    let mut out: Vec<TaskId> = Vec::new();
    for binding in bindings.iter().filter(|b| b.matches(rel)) {
        for task in binding.tasks() {
            if !out.contains(task) {
                out.push(*task);
            }
        }
    }
    out
}

/// Check that each binding lists its tasks in graph order and only names
/// tasks the graph contains.
pub fn validate_binding_order(bindings: &[WatchBinding], graph: &BuildGraph) -> Result<()> {
    for binding in bindings {
        let mut last_rank = None;
        for task in &binding.tasks {
            let Some(rank) = graph.rank_of(*task) else {
                bail!(
                    "watch binding '{}' names task '{}' which is not part of this pipeline",
                    binding.pattern,
                    task
                );
            };
            if last_rank.is_some_and(|last| rank < last) {
                bail!(
                    "watch binding '{}' lists task '{}' out of dependency order",
                    binding.pattern,
                    task
                );
            }
            last_rank = Some(rank);
        }
    }
    Ok(())
}
