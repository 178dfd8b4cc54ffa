use std::fmt;
use std::marker::PhantomData;

/// Proof that the current code runs on a scheduler's main thread.
///
/// A `MainThread` can only be obtained from [`Scheduler::main_thread`] (which
/// checks the calling thread) or is handed to callables submitted through
/// [`Scheduler::schedule_task_on_main`]. It is neither `Send` nor `Sync`, so it
/// cannot leak to another thread, and it borrows the scheduler it came from.
///
/// Functions that touch host state can take a `MainThread<'_>` parameter to
/// turn the "main thread only" convention into a compile-time requirement:
///
/// ```
/// use handoff::{Builder, MainThread};
///
/// fn active_item_name(_main: MainThread<'_>) -> String {
///     // Call into the host API here.
///     "Comp 1".to_string()
/// }
///
/// # fn main() -> anyhow::Result<()> {
/// let scheduler = Builder::new().try_build()?;
/// let main = scheduler.main_thread().expect("built on this thread");
/// assert_eq!(active_item_name(main), "Comp 1");
/// # Ok(())
/// # }
/// ```
///
/// [`Scheduler::main_thread`]: crate::Scheduler::main_thread
/// [`Scheduler::schedule_task_on_main`]: crate::Scheduler::schedule_task_on_main
#[derive(Clone, Copy)]
pub struct MainThread<'a> {
    _scheduler: PhantomData<&'a ()>,
    _not_send: PhantomData<*const ()>,
}

impl MainThread<'_> {
    /// Callers must have checked that the current thread is the main thread
    /// of the scheduler the token is tied to.
    pub(crate) fn new() -> Self {
        Self {
            _scheduler: PhantomData,
            _not_send: PhantomData,
        }
    }
}

impl fmt::Debug for MainThread<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainThread").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_not_impl_any;

    assert_not_impl_any!(MainThread<'static>: Send, Sync);
}
