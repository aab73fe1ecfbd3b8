// src/engine/queue.rs

use std::collections::{BTreeSet, VecDeque};

use tracing::{debug, warn};

use crate::types::{TaskId, TriggerWhileRunningBehaviour};

/// Triggers held back until the active run finishes.
///
/// Entries are batches of tasks for a future run. In `queue` mode new
/// triggers are folded into the newest batch and at most `limit` batches
/// are kept; in `cancel` mode a trigger replaces everything queued so far.
/// Draining merges all batches into the task list of one run, so three
/// saves of a stylesheet during a bundle cost one follow-up run.
#[derive(Debug)]
pub struct TriggerQueue {
    behaviour: TriggerWhileRunningBehaviour,
    limit: usize,
    batches: VecDeque<BTreeSet<TaskId>>,
}

impl TriggerQueue {
    /// `limit` below 1 is treated as 1.
    pub fn new(behaviour: TriggerWhileRunningBehaviour, limit: usize) -> Self {
        Self {
            behaviour,
            limit: limit.max(1),
            batches: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Hold back `tasks`, triggered together, for the next run.
    ///
    /// In `cancel` mode the batch as a whole replaces what was queued, so
    /// a stylesheet save keeps both its compile and its bundle trigger.
    pub fn record_batch(&mut self, tasks: &[TaskId]) {
        if tasks.is_empty() {
            return;
        }

        if self.behaviour == TriggerWhileRunningBehaviour::Cancel && !self.batches.is_empty() {
            debug!(tasks = ?tasks, dropped = self.batches.len(), "cancel mode: replacing queued triggers");
            self.batches.clear();
        }

        match self.batches.back_mut() {
            Some(batch) => batch.extend(tasks.iter().copied()),
            None => self.batches.push_back(tasks.iter().copied().collect()),
        }
        debug!(tasks = ?tasks, "triggers queued for the next run");

        let excess = self.batches.len().saturating_sub(self.limit);
        if excess > 0 {
            warn!(limit = self.limit, excess, "queue_length exceeded; oldest queued triggers dropped");
            self.batches.drain(..excess);
        }
    }

    /// Empty the queue, returning the union of every batch.
    pub fn drain_pending(&mut self) -> Vec<TaskId> {
        let tasks: BTreeSet<TaskId> = self.batches.drain(..).flatten().collect();
        if !tasks.is_empty() {
            debug!(tasks = ?tasks, "queued triggers released");
        }
        tasks.into_iter().collect()
    }
}
