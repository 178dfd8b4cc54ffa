use crate::context::MainThread;
use crate::task::{Completion, Id, Result, TaskError, panic_payload_as_str};
use crossbeam_channel::Sender;
use std::panic;

/// Type-erased half of a task that the main thread drives.
pub(super) trait Runnable: Send {
    /// Runs the callable and resolves the handle. Panics are caught.
    fn run(self: Box<Self>, main: MainThread<'_>) -> Completion;

    /// Resolves the handle as cancelled without running the callable.
    fn cancel(self: Box<Self>);
}

/// Typed raw task: the callable and the sending half of its result channel.
pub(super) struct RawTask<F, T> {
    id: Id,
    func: F,
    tx: Sender<Result<T>>,
}

impl<F, T> RawTask<F, T> {
    pub(super) fn new(id: Id, func: F, tx: Sender<Result<T>>) -> Self {
        Self { id, func, tx }
    }
}

impl<F, T> Runnable for RawTask<F, T>
where
    F: for<'m> FnOnce(MainThread<'m>) -> T + Send + 'static,
    T: Send + 'static,
{
    fn run(self: Box<Self>, main: MainThread<'_>) -> Completion {
        let RawTask { id, func, tx } = *self;

        let (res, completion) = match panic::catch_unwind(panic::AssertUnwindSafe(|| func(main))) {
            Ok(value) => (Ok(value), Completion::Complete),
            Err(payload) => (Err(TaskError::panic(id, payload)), Completion::Panicked),
        };

        // The channel has capacity one and this is its only send, so it never
        // blocks. It only fails when nobody holds the handle anymore.
        if let Err(unclaimed) = tx.send(res) {
            match unclaimed.into_inner() {
                Err(err) => {
                    if let Ok(payload) = err.try_into_panic() {
                        tracing::error!(
                            task.id = %id,
                            panic.message = panic_payload_as_str(&*payload)
                                .unwrap_or("<non-string payload>"),
                            "detached task panicked"
                        );
                        drop_unwind_safe(payload);
                    }
                }
                Ok(value) => drop_unwind_safe(value),
            }
        }

        completion
    }

    fn cancel(self: Box<Self>) {
        let RawTask { id, func, tx } = *self;
        tracing::trace!(task.id = %id, "task cancelled before it ran");

        drop_unwind_safe(func);
        let _ = tx.send(Err(TaskError::cancelled(id)));
    }
}

/// Drops `value` on the main thread without letting a panicking destructor
/// escape into the drain loop.
fn drop_unwind_safe<V>(value: V) {
    if panic::catch_unwind(panic::AssertUnwindSafe(move || drop(value))).is_err() {
        tracing::error!("destructor panicked on the main thread");
    }
}
