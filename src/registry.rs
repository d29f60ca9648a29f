//! Run-owned registry of permanently failed message ids.
//!
//! Replaces a process-wide mutable failure list with a value owned by the
//! run: the downloader creates one registry per instance and hands cloned
//! handles into each per-message task. Ids are only appended after a task
//! reaches its terminal state, and the set is snapshotted exactly once when
//! the run report is built.

use crate::types::MessageId;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Append-only set of permanently failed message ids.
///
/// Cloning is cheap; all clones share the same underlying set.
#[derive(Clone, Debug, Default)]
pub struct FailureRegistry {
    inner: Arc<Mutex<BTreeSet<MessageId>>>,
}

impl FailureRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a permanently failed message id.
    ///
    /// Recording the same id more than once has no effect (set semantics).
    pub fn record(&self, id: MessageId) {
        self.lock().insert(id);
    }

    /// Whether an id has been recorded
    pub fn contains(&self, id: MessageId) -> bool {
        self.lock().contains(&id)
    }

    /// Number of recorded ids
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no ids have been recorded
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the recorded ids, for the end-of-run report
    pub fn snapshot(&self) -> BTreeSet<MessageId> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<MessageId>> {
        // A poisoned lock only means a panicking task died mid-insert; the
        // set itself is still a valid set of ids.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
