//! Tracking of locally spawned fetch tasks.

use std::cell::RefCell;
use std::future::Future;

use tokio::task::JoinHandle;
use tracing::warn;

/// Fetch tasks spawned on the current `LocalSet`.
#[derive(Debug, Default)]
pub(crate) struct TaskSet {
    handles: RefCell<Vec<JoinHandle<()>>>,
}

impl TaskSet {
    /// Spawn `task` on the current `LocalSet`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `LocalSet`, as `tokio::task::spawn_local` does.
    pub(crate) fn spawn(&self, task: impl Future<Output = ()> + 'static) {
        let mut handles = self.handles.borrow_mut();
        handles.retain(|h| !h.is_finished());
        handles.push(tokio::task::spawn_local(task));
    }

    /// Number of tasks that have not completed.
    pub(crate) fn in_flight(&self) -> usize {
        self.handles
            .borrow()
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Wait until every task, including ones spawned while waiting, has completed.
    pub(crate) async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.handles.borrow_mut());
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    warn!(error = %err, "engine.task: fetch task did not complete");
                }
            }
        }
    }
}
