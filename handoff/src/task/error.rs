use crate::task::Id;
use crate::utils::SyncWrapper;
use std::any::Any;
use std::fmt;
use std::panic;

/// Task failed to produce a value.
///
/// Returned by [`TaskHandle::get`] and [`Scheduler::schedule_or_execute`] when
/// the callable panicked on the main thread, was aborted before it ran, or was
/// dropped without running because its scheduler went away.
///
/// Errors the callable *returns* are not a `TaskError`: make the callable
/// return a `Result` and it travels back to the caller untouched.
///
/// [`TaskHandle::get`]: crate::TaskHandle::get
/// [`Scheduler::schedule_or_execute`]: crate::Scheduler::schedule_or_execute
pub struct TaskError {
    id: Id,
    repr: Repr,
}

enum Repr {
    Cancelled,
    Abandoned,
    Panic(SyncWrapper<Box<dyn Any + Send + 'static>>),
}

impl TaskError {
    pub(crate) fn cancelled(id: Id) -> TaskError {
        TaskError {
            id,
            repr: Repr::Cancelled,
        }
    }

    pub(crate) fn abandoned(id: Id) -> TaskError {
        TaskError {
            id,
            repr: Repr::Abandoned,
        }
    }

    pub(crate) fn panic(id: Id, payload: Box<dyn Any + Send + 'static>) -> TaskError {
        TaskError {
            id,
            repr: Repr::Panic(SyncWrapper::new(payload)),
        }
    }

    /// The task was aborted through an [`AbortHandle`] before it ran.
    ///
    /// [`AbortHandle`]: crate::AbortHandle
    pub fn is_cancelled(&self) -> bool {
        matches!(&self.repr, Repr::Cancelled)
    }

    /// The task was dropped without running, e.g. the scheduler shut down
    /// while it was still queued.
    pub fn is_abandoned(&self) -> bool {
        matches!(&self.repr, Repr::Abandoned)
    }

    /// The callable panicked.
    pub fn is_panic(&self) -> bool {
        matches!(&self.repr, Repr::Panic(_))
    }

    /// Returns the panic message, if the task panicked with a string payload
    /// (which `panic!` with a message always does).
    pub fn panic_message(&self) -> Option<&str> {
        match &self.repr {
            Repr::Panic(payload) => payload
                .downcast_ref_sync::<&'static str>()
                .copied()
                .or_else(|| payload.downcast_ref_sync::<String>().map(String::as_str)),
            _ => None,
        }
    }

    /// Consumes the error, returning the object with which the task panicked.
    ///
    /// # Panics
    ///
    /// `into_panic()` panics if the task did not panic. See
    /// [`try_into_panic`](TaskError::try_into_panic) for a non-panicking
    /// variant.
    #[track_caller]
    pub fn into_panic(self) -> Box<dyn Any + Send + 'static> {
        self.try_into_panic().expect("`TaskError` reason is not a panic.")
    }

    /// Consumes the error, returning the object with which the task panicked,
    /// or gives the error back if the task did not panic.
    pub fn try_into_panic(self) -> Result<Box<dyn Any + Send + 'static>, TaskError> {
        match self.repr {
            Repr::Panic(payload) => Ok(payload.into_inner()),
            _ => Err(self),
        }
    }

    /// Re-raises the task's panic on the current thread. Other failures are
    /// raised as a new panic carrying this error's message.
    pub fn resume_unwind(self) -> ! {
        match self.try_into_panic() {
            Ok(payload) => panic::resume_unwind(payload),
            Err(err) => panic!("{}", err),
        }
    }

    /// Returns the [`Id`] of the task that failed.
    pub fn id(&self) -> Id {
        self.id
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Cancelled => write!(fmt, "task {} was cancelled", self.id),
            Repr::Abandoned => write!(fmt, "task {} was abandoned before it ran", self.id),
            Repr::Panic(_) => match self.panic_message() {
                Some(msg) => write!(fmt, "task {} panicked with message {:?}", self.id, msg),
                None => write!(fmt, "task {} panicked", self.id),
            },
        }
    }
}

impl fmt::Debug for TaskError {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Cancelled => write!(fmt, "TaskError::Cancelled({:?})", self.id),
            Repr::Abandoned => write!(fmt, "TaskError::Abandoned({:?})", self.id),
            Repr::Panic(_) => match self.panic_message() {
                Some(msg) => write!(fmt, "TaskError::Panic({:?}, {:?}, ...)", self.id, msg),
                None => write!(fmt, "TaskError::Panic({:?}, ...)", self.id),
            },
        }
    }
}

impl std::error::Error for TaskError {}

/// Best-effort string view of a panic payload.
pub(crate) fn panic_payload_as_str(payload: &(dyn Any + Send)) -> Option<&str> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return Some(s);
    }

    if let Some(s) = payload.downcast_ref::<String>() {
        return Some(s);
    }

    None
}
