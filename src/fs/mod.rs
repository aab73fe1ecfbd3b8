// src/fs/mod.rs

//! Async filesystem helpers shared by the build tasks.
//!
//! Every write goes through [`write_file`] so output directories are created
//! on demand.

use std::path::Path;

use anyhow::{Context, Result};
use blake3::Hasher;
use tokio::io::AsyncReadExt;

/// Read a UTF-8 file.
pub async fn read_to_string(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading file {:?}", path))
}

/// Write `contents` to `path`, creating parent directories first.
pub async fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating dir {:?}", parent))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("writing to file {:?}", path))
}

/// Copy `from` to `to` byte for byte, creating parent directories first.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating dir {:?}", parent))?;
    }
    tokio::fs::copy(from, to)
        .await
        .with_context(|| format!("copying {:?} to {:?}", from, to))
}

/// Whether `path` exists (errors other than "not found" count as absent).
pub async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Compute the blake3 hash of a file, or `None` if it does not exist.
pub async fn file_digest(path: &Path) -> Result<Option<String>> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("opening file for hashing: {:?}", path));
        }
    };

    let mut hasher = Hasher::new();
    let mut buf = vec![0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .with_context(|| format!("reading file for hashing: {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Some(hasher.finalize().to_hex().to_string()))
}

/// True when both files exist and have identical contents.
pub async fn same_contents(a: &Path, b: &Path) -> Result<bool> {
    let (da, db) = tokio::join!(file_digest(a), file_digest(b));
    match (da?, db?) {
        (Some(x), Some(y)) => Ok(x == y),
        _ => Ok(false),
    }
}
