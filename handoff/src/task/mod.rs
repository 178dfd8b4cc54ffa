//! Units of work handed to the main thread, and the handles used to get
//! their results back.
//!
//! Every submitted closure becomes a [`Task`] that owns the sending half of a
//! one-shot channel. The submitting thread keeps the [`TaskHandle`] with the
//! receiving half. The main thread resolves the channel exactly once: with the
//! closure's value, with a [`TaskError`] describing its panic, or with a
//! cancellation error if the task was aborted before it ran. A task that is
//! dropped without ever running (for instance because the scheduler shut
//! down) closes the channel, which the handle reports as an abandoned task.

use crate::context::MainThread;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// Public API
pub mod abort;
pub use self::abort::AbortHandle;

mod error;
pub use self::error::TaskError;
pub(crate) use self::error::panic_payload_as_str;

mod handle;
pub use self::handle::TaskHandle;

pub mod id;
pub use self::id::Id;

// Internals
mod harness;
use self::harness::{RawTask, Runnable};

/// Task result sent back to the handle.
pub type Result<T> = std::result::Result<T, TaskError>;

/// What happened to a task when the main thread got to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Completion {
    /// The callable ran and returned.
    Complete,
    /// The callable ran and panicked.
    Panicked,
    /// The task was aborted before it ran; the callable never ran.
    Cancelled,
}

/// A queued unit of work. Executed at most once, on the main thread.
pub(crate) struct Task {
    id: Id,
    cancelled: Arc<AtomicBool>,
    raw: Box<dyn Runnable>,
}

impl Task {
    pub(crate) fn id(&self) -> Id {
        self.id
    }

    /// Runs the callable, or resolves the task as cancelled if it was aborted
    /// while queued. Never unwinds.
    pub(crate) fn run(self, main: MainThread<'_>) -> Completion {
        if self.cancelled.load(Ordering::Acquire) {
            self.raw.cancel();
            Completion::Cancelled
        } else {
            self.raw.run(main)
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("cancelled", &self.cancelled.load(Ordering::Relaxed))
            .finish()
    }
}

/// Constructor for a new task and the handle observing it.
pub(crate) fn new_task<F, T>(func: F) -> (Task, TaskHandle<T>)
where
    F: for<'m> FnOnce(MainThread<'m>) -> T + Send + 'static,
    T: Send + 'static,
{
    let id = Id::next();

    // Capacity of one: the single send never blocks the main thread.
    let (tx, rx) = crossbeam_channel::bounded(1);
    let cancelled = Arc::new(AtomicBool::new(false));

    let task = Task {
        id,
        cancelled: cancelled.clone(),
        raw: Box::new(RawTask::new(id, func, tx)),
    };

    (task, TaskHandle::new(id, rx, cancelled))
}
