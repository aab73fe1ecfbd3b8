// src/config/validate.rs

use std::path::{Component, Path, PathBuf};

use crate::config::model::{ConfigFile, PathConfig, RawConfigFile, WatchSection};
use crate::errors::{PipelineError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::PipelineError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.paths, raw.server, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths(&cfg.paths)?;
    validate_roots_disjoint(&cfg.paths)?;
    validate_watch_section(&cfg.watch)?;
    Ok(())
}

fn validate_paths(paths: &PathConfig) -> Result<()> {
    let all = [
        ("source_root", &paths.source_root),
        ("output_root", &paths.output_root),
        ("sass_dir", &paths.sass_dir),
        ("js_dir", &paths.js_dir),
        ("css_dir", &paths.css_dir),
        ("font_dir", &paths.font_dir),
        ("dependency_dir", &paths.dependency_dir),
    ];
    for (key, value) in all {
        if value.as_os_str().is_empty() {
            return Err(PipelineError::Config(format!(
                "[paths].{key} must not be empty"
            )));
        }
    }

    let sub_dirs = [
        ("sass_dir", &paths.sass_dir),
        ("js_dir", &paths.js_dir),
        ("css_dir", &paths.css_dir),
        ("font_dir", &paths.font_dir),
    ];
    for (key, value) in sub_dirs {
        if value.is_absolute() {
            return Err(PipelineError::Config(format!(
                "[paths].{key} must be relative to its root (got {:?})",
                value
            )));
        }
    }

    Ok(())
}

fn validate_roots_disjoint(paths: &PathConfig) -> Result<()> {
    let source = normalize(&paths.source_root);
    let output = normalize(&paths.output_root);

    if source == output {
        return Err(PipelineError::Config(format!(
            "[paths].source_root and [paths].output_root must differ (both are {:?})",
            paths.source_root
        )));
    }
    if output.starts_with(&source) || source.starts_with(&output) {
        return Err(PipelineError::Config(format!(
            "[paths].source_root {:?} and [paths].output_root {:?} must not contain each other",
            paths.source_root, paths.output_root
        )));
    }
    Ok(())
}

fn validate_watch_section(watch: &WatchSection) -> Result<()> {
    if watch.queue_length == 0 {
        return Err(PipelineError::Config(
            "[watch].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Lexically normalize a path (drop `.` segments, resolve `..` where possible)
/// so `./app/` and `app` compare equal.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
