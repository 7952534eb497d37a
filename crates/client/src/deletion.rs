//! Staged deletion: an explicit state machine per pending delete.
//!
//! A staged deletion soft-removes a todo from the view and starts a
//! cancellable timer window. Undo before the window elapses restores the
//! item without any server call; expiry issues the real delete, restoring
//! the item if that deferred call fails.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lifecycle of one staged deletion.
///
/// `Staged` is the initial state; the machine terminates in `Committed`
/// (server delete succeeded) or `Restored` (undo, or deferred failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionState {
    Staged,
    Committed,
    Restored,
}

/// Handle to a staged deletion spawned by the store.
pub struct StagedDeletion {
    cancel: CancellationToken,
    state: watch::Receiver<DeletionState>,
    task: JoinHandle<()>,
}

impl StagedDeletion {
    pub(crate) fn new(
        cancel: CancellationToken,
        state: watch::Receiver<DeletionState>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            cancel,
            state,
            task,
        }
    }

    /// Cancel the pending deletion: the staged todo is restored to the view
    /// and no server call is made. A no-op once the window has elapsed.
    pub fn undo(&self) {
        self.cancel.cancel();
    }

    /// Current state of the deletion.
    pub fn state(&self) -> DeletionState {
        *self.state.borrow()
    }

    /// Wait for the deletion to terminate, returning the final state.
    pub async fn finished(self) -> DeletionState {
        let _ = self.task.await;
        *self.state.borrow()
    }
}
