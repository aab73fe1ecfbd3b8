// src/tasks/fileset.rs

//! Glob-selected, ordered sets of source files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};

/// One selected file: its full path and its path relative to the set's base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub relative: PathBuf,
}

impl FileEntry {
    /// File name without directories (`main.scss`).
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// The files under `base` whose relative path matches a glob pattern.
///
/// Entries are sorted by relative path so downstream output is deterministic.
/// A missing base directory yields an empty set rather than an error.
#[derive(Debug, Clone)]
pub struct FileSet {
    entries: Vec<FileEntry>,
}

impl FileSet {
    /// Walk `base` and keep every regular file matching `pattern`.
    ///
    /// `*` does not cross directory separators; `**` does.
    pub async fn resolve(base: &Path, pattern: &str) -> Result<Self> {
        let matcher = compile_glob(pattern)?;
        let mut entries = Vec::new();

        if !crate::fs::exists(base).await {
            return Ok(Self { entries });
        }

        let mut stack = vec![base.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let mut rd = tokio::fs::read_dir(&dir)
                .await
                .with_context(|| format!("reading dir {:?}", dir))?;

            while let Some(entry) = rd
                .next_entry()
                .await
                .with_context(|| format!("reading dir {:?}", dir))?
            {
                let path = entry.path();
                let meta = tokio::fs::metadata(&path)
                    .await
                    .with_context(|| format!("reading metadata of {:?}", path))?;

                if meta.is_dir() {
                    stack.push(path);
                } else if meta.is_file() {
                    let Ok(rel) = path.strip_prefix(base) else {
                        continue;
                    };
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if matcher.is_match(&rel_str) {
                        entries.push(FileEntry {
                            relative: rel.to_path_buf(),
                            path,
                        });
                    }
                }
            }
        }

        entries.sort_by(|a, b| a.relative.cmp(&b.relative));

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for FileSet {
    type Item = FileEntry;
    type IntoIter = std::vec::IntoIter<FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Compile a glob where `*` stays within one path segment.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;
    Ok(glob.compile_matcher())
}
