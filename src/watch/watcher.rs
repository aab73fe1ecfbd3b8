// src/watch/watcher.rs

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::watch::bindings::CompiledBinding;
use crate::watch::event_handler::process_file_change;

/// Keeps the OS watcher alive; drop it to stop watching.
pub struct WatcherHandle {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// Watch the source root recursively, turning changes into `TaskTriggered`
/// events through `bindings`.
///
/// Fails if `root` does not exist. Must be called inside a tokio runtime.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    bindings: Vec<CompiledBinding>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let given = root.into();
    let root = given
        .canonicalize()
        .with_context(|| format!("resolving source root {:?}", given))?;

    // notify calls back on its own thread; hop into tokio through a channel.
    let (fs_tx, mut fs_rx) = mpsc::unbounded_channel::<Event>();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = fs_tx.send(event);
            }
            Err(err) => eprintln!("[assetflow] file watch error: {err}"),
        },
        Config::default(),
    )
    .context("creating file watcher")?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {:?}", root))?;
    info!(root = ?root, "watching for source changes");

    let bindings = Arc::new(bindings);
    let loop_root = root.clone();
    tokio::spawn(async move {
        while let Some(event) = fs_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            for path in &event.paths {
                if !process_file_change(&loop_root, path, &bindings, &runtime_tx).await {
                    return;
                }
            }
        }
        debug!("file watcher stopped");
    });

    Ok(WatcherHandle {
        _watcher: watcher,
        root,
    })
}
