use std::thread::ThreadId;

/// Misuse of a [`Scheduler`] detected at runtime.
///
/// Failures of individual tasks are reported through their handle as a
/// [`TaskError`] instead.
///
/// [`Scheduler`]: crate::Scheduler
/// [`TaskError`]: crate::TaskError
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Tasks can only be executed on the thread the scheduler is bound to.
    /// Nothing was executed.
    #[error("tasks must be executed on main thread {expected:?}, not {actual:?}")]
    NotMainThread { expected: ThreadId, actual: ThreadId },

    /// `execute_tasks` was called by a task that is itself being executed.
    /// Tasks never nest; the outer drain keeps going.
    #[error("cannot execute tasks from inside a running task")]
    ReentrantDrain,

    /// The scheduler was shut down. Pending tasks were abandoned.
    #[error("scheduler has been shut down")]
    Shutdown,
}

impl Error {
    pub fn is_not_main_thread(&self) -> bool {
        matches!(self, Error::NotMainThread { .. })
    }
}
