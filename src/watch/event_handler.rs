// src/watch/event_handler.rs

//! Turning one changed path into task triggers.

use std::path::Path;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::bindings::{tasks_for_path, CompiledBinding};
use crate::watch::path_utils::relative_str;

/// Send a `FileWatch` trigger for each task bound to `path`, in declared
/// order.
///
/// Returns `false` only when the runtime has gone away.
pub async fn process_file_change(
    root: &Path,
    path: &Path,
    bindings: &[CompiledBinding],
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let Some(rel) = relative_str(root, path) else {
        trace!(?path, "outside the source root");
        return true;
    };

    let tasks = tasks_for_path(bindings, &rel);
    if !tasks.is_empty() {
        debug!(file = %rel, ?tasks, "source changed");
    }

    for task in tasks {
        let event = RuntimeEvent::TaskTriggered {
            task,
            reason: TriggerReason::FileWatch,
        };
        if runtime_tx.send(event).await.is_err() {
            debug!("runtime channel closed; dropping file trigger");
            return false;
        }
    }
    true
}
