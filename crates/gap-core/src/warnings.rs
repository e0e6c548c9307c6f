//! Process-wide FIFO of warnings reported at the end of a run.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Queue of deferred warnings.
///
/// Any component may push; the queue is drained once, at normal completion
/// or from the interrupt handler, which runs on its own thread. Clones share
/// the same queue.
#[derive(Debug, Clone, Default)]
pub struct DeferredWarnings {
    queue: Arc<Mutex<VecDeque<String>>>,
}

impl DeferredWarnings {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a warning to the back of the queue.
    pub fn push(&self, warning: impl Into<String>) {
        self.lock().push_back(warning.into());
    }

    /// Number of queued warnings.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no warning has been queued.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies the queued warnings in insertion order, leaving the queue intact.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    /// Removes and returns every queued warning in insertion order.
    pub fn drain(&self) -> Vec<String> {
        self.lock().drain(..).collect()
    }

    /// Drains the queue into a printable report; `None` when nothing was queued.
    pub fn report(&self) -> Option<String> {
        let warnings = self.drain();
        if warnings.is_empty() {
            return None;
        }
        let mut out = String::from(
            "=====\nThe following delayed warnings were recorded by gapbench:\n=====\n",
        );
        for warning in warnings {
            for line in warning.lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
        Some(out)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        // A panic while holding the lock leaves the queue itself intact.
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
