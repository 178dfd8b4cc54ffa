use crate::task::Id;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// An owned permission to cancel a queued task, without awaiting its result.
///
/// Cancellation is cooperative: the main thread checks the flag right before
/// it would run the task. A task that was aborted in time never runs and its
/// handle resolves to a [cancelled] `TaskError`. Aborting a task that already
/// ran, or is running, has no effect.
///
/// Dropping an `AbortHandle` does *not* abort the task.
///
/// [cancelled]: method@crate::TaskError::is_cancelled
#[derive(Clone)]
pub struct AbortHandle {
    id: Id,
    cancelled: Arc<AtomicBool>,
}

impl AbortHandle {
    pub(crate) fn new(id: Id, cancelled: Arc<AtomicBool>) -> Self {
        Self { id, cancelled }
    }

    /// Abort the task associated with the handle.
    pub fn abort(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Checks whether [`abort`] was called on this task.
    ///
    /// This does not mean the task was cancelled: it may have run before the
    /// main thread saw the request.
    ///
    /// [`abort`]: AbortHandle::abort
    pub fn is_abort_requested(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns the [task ID] of the associated task.
    ///
    /// [task ID]: crate::task::Id
    pub fn id(&self) -> Id {
        self.id
    }
}

impl fmt::Debug for AbortHandle {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("AbortHandle")
            .field("id", &self.id)
            .field("abort_requested", &self.is_abort_requested())
            .finish()
    }
}
