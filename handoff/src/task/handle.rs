use crate::task::{AbortHandle, Id, Result, TaskError};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// An owned permission to retrieve the result of a task submitted to a
/// [`Scheduler`].
///
/// This is the blocking counterpart of a future: the task runs on the main
/// thread the next time the scheduler drains its queue, and the thread
/// holding the handle can block until then with [`get`] or [`wait`].
///
/// [`get`] consumes the handle, so a result can only be retrieved once.
/// Dropping the handle detaches the task: it still runs, and its value is
/// dropped on the main thread.
///
/// # Deadlocks
///
/// Never block on a handle from the main thread itself: the queue can only
/// drain on that thread, so it would wait forever. Use
/// [`Scheduler::schedule_or_execute`], which runs the callable inline when
/// called from the main thread.
///
/// # Examples
///
/// ```
/// use handoff::Builder;
///
/// # fn main() -> anyhow::Result<()> {
/// let scheduler = Builder::new().try_build()?;
/// let remote = scheduler.clone();
///
/// let worker = std::thread::spawn(move || {
///     let handle = remote.schedule_task(|| "Comp 1".to_string());
///     handle.get()
/// });
///
/// while !worker.is_finished() {
///     scheduler.execute_tasks()?;
/// }
///
/// assert_eq!(worker.join().unwrap()?, "Comp 1");
/// # Ok(())
/// # }
/// ```
///
/// [`Scheduler`]: crate::Scheduler
/// [`Scheduler::schedule_or_execute`]: crate::Scheduler::schedule_or_execute
/// [`get`]: TaskHandle::get
/// [`wait`]: TaskHandle::wait
pub struct TaskHandle<T> {
    id: Id,
    rx: Receiver<Result<T>>,

    /// Result received by `wait`, `wait_timeout` or `is_finished` and not yet
    /// taken by `get`.
    resolved: OnceCell<Result<T>>,

    cancelled: Arc<AtomicBool>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: Id, rx: Receiver<Result<T>>, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            id,
            rx,
            resolved: OnceCell::new(),
            cancelled,
        }
    }

    /// Blocks until the task has been executed and returns its value.
    ///
    /// Returns a [`TaskError`] if the callable panicked, was aborted before it
    /// ran, or was dropped without running.
    pub fn get(self) -> Result<T> {
        let TaskHandle {
            id, rx, resolved, ..
        } = self;

        match resolved.into_inner() {
            Some(res) => res,
            None => rx.recv().unwrap_or_else(|_| Err(TaskError::abandoned(id))),
        }
    }

    /// Blocks until the task has been executed, without taking its value.
    ///
    /// Useful when the caller only needs ordering. A later [`get`] returns
    /// immediately.
    ///
    /// [`get`]: TaskHandle::get
    pub fn wait(&self) {
        self.resolved.get_or_init(|| {
            self.rx
                .recv()
                .unwrap_or_else(|_| Err(TaskError::abandoned(self.id)))
        });
    }

    /// Blocks until the task has been executed or `timeout` elapsed.
    ///
    /// Returns `true` if the task is resolved. On timeout the task stays
    /// queued and may still run later; there is no way to take it back, only
    /// to [`abort`] it before the main thread gets to it.
    ///
    /// [`abort`]: TaskHandle::abort
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.resolved.get().is_some() {
            return true;
        }

        match self.rx.recv_timeout(timeout) {
            Ok(res) => self.store(res),
            Err(RecvTimeoutError::Timeout) => return false,
            Err(RecvTimeoutError::Disconnected) => self.store(Err(TaskError::abandoned(self.id))),
        }

        true
    }

    /// Checks if the task has been resolved, without blocking.
    pub fn is_finished(&self) -> bool {
        if self.resolved.get().is_some() {
            return true;
        }

        match self.rx.try_recv() {
            Ok(res) => self.store(res),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => self.store(Err(TaskError::abandoned(self.id))),
        }

        true
    }

    /// Returns the [task ID] of the associated task.
    ///
    /// [task ID]: crate::task::Id
    pub fn id(&self) -> Id {
        self.id
    }

    /// Requests cancellation of the task. See [`AbortHandle::abort`].
    pub fn abort(&self) {
        self.abort_handle().abort();
    }

    /// Returns a new `AbortHandle` that can be used to cancel the task from
    /// another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle::new(self.id, self.cancelled.clone())
    }

    fn store(&self, res: Result<T>) {
        // The handle is `!Sync` and every caller checked `resolved` first, so
        // the cell is always empty here.
        let _ = self.resolved.set(res);
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("TaskHandle")
            .field("id", &self.id)
            .field("resolved", &self.resolved.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::context::MainThread;
    use crate::task::new_task;
    use static_assertions::assert_not_impl_any;
    use std::thread;
    use std::time::Duration;

    assert_not_impl_any!(super::TaskHandle<u32>: Sync);

    #[test]
    fn test_wait_then_get() {
        let (task, handle) = new_task(|_| vec![1, 2, 3]);
        task.run(MainThread::new());

        handle.wait();
        handle.wait();
        assert!(handle.is_finished());
        assert_eq!(handle.get().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_wait_timeout_before_and_after_resolution() {
        let (task, handle) = new_task(|_| 7);

        assert!(!handle.wait_timeout(Duration::from_millis(10)));
        assert!(!handle.is_finished());

        task.run(MainThread::new());

        assert!(handle.wait_timeout(Duration::from_millis(10)));
        assert_eq!(handle.get().unwrap(), 7);
    }

    #[test]
    fn test_get_blocks_until_resolved_from_other_thread() {
        let (task, handle) = new_task(|_| "done");

        let resolver = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            task.run(MainThread::new());
        });

        assert_eq!(handle.get().unwrap(), "done");
        resolver.join().unwrap();
    }

    #[test]
    fn test_wait_on_dropped_task_resolves_abandoned() {
        let (task, handle) = new_task(|_| ());
        drop(task);

        handle.wait();
        assert!(handle.get().unwrap_err().is_abandoned());
    }

    #[test]
    fn test_abort_handle_shares_flag() {
        let (task, handle) = new_task(|_| 1);
        let abort = handle.abort_handle();
        assert_eq!(abort.id(), handle.id());
        assert!(!abort.is_abort_requested());

        thread::spawn(move || abort.abort()).join().unwrap();
        task.run(MainThread::new());

        assert!(handle.get().unwrap_err().is_cancelled());
    }

    #[test]
    fn test_dropped_handle_detaches_task() {
        let (task, handle) = new_task(|_| String::from("unclaimed"));
        drop(handle);

        // Sending to a closed channel must not panic on the main thread.
        task.run(MainThread::new());
    }
}
