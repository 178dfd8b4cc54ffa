//! Process-wide scheduler, for code that cannot be handed a [`Scheduler`].
//!
//! Prefer building a scheduler explicitly and passing it around: the global
//! one binds its main thread lazily, on the first drain, so
//! [`schedule_or_execute`] on the main thread blocks forever if nobody has
//! drained or called [`Scheduler::bind_main_thread`] yet. Creating an
//! [`IdlePump`] over it binds it.
//!
//! [`IdlePump`]: crate::IdlePump

use crate::scheduler::{DrainReport, Error, Scheduler, SchedulerConfig};
use crate::task::{self, TaskHandle};
use std::sync::OnceLock;

/// Returns the global scheduler, creating it on first use.
///
/// It is never torn down.
pub fn global() -> &'static Scheduler {
    static GLOBAL: OnceLock<Scheduler> = OnceLock::new();
    GLOBAL.get_or_init(|| Scheduler::new(SchedulerConfig::default()))
}

/// [`Scheduler::schedule_task`] on the [`global`] scheduler.
pub fn schedule_task<F, T>(func: F) -> TaskHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    global().schedule_task(func)
}

/// [`Scheduler::schedule_or_execute`] on the [`global`] scheduler.
pub fn schedule_or_execute<F, T>(func: F) -> task::Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    global().schedule_or_execute(func)
}

/// [`Scheduler::post`] on the [`global`] scheduler.
pub fn post<F>(func: F)
where
    F: FnOnce() + Send + 'static,
{
    global().post(func)
}

/// [`Scheduler::execute_tasks`] on the [`global`] scheduler.
pub fn execute_tasks() -> Result<DrainReport, Error> {
    global().execute_tasks()
}
