// src/watch/path_utils.rs

//! Path helpers shared by the watch bindings and the event handler.

use std::path::{Component, Path};

/// `path` relative to `root`, with forward slashes.
///
/// Falls back to comparing canonical paths when the plain prefix check fails
/// (symlinked temp dirs on macOS report `/private/var/...`). Returns `None`
/// for paths outside `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(slashes(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = match path.canonicalize() {
        Ok(p) => p,
        // Removed files cannot be canonicalized; resolve the parent instead.
        Err(_) => {
            let parent = path.parent()?.canonicalize().ok()?;
            parent.join(path.file_name()?)
        }
    };
    path_canon.strip_prefix(&root_canon).ok().map(slashes)
}

/// A source-root-relative directory as a glob prefix (`./sass/` -> `sass`).
pub fn glob_prefix(dir: &Path) -> String {
    dir.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn slashes(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}
