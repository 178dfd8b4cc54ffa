//! The main-thread scheduler: submission from any thread, draining on the
//! main thread.

use crate::task::Completion;
use bitflags::bitflags;

// Public API
mod builder;
pub use builder::{Builder, MainThreadBinding};
pub(crate) use builder::SchedulerConfig;

mod errors;
pub use errors::Error;

mod global;
pub use global::{execute_tasks, global, post, schedule_or_execute, schedule_task};

#[allow(clippy::module_inception)]
mod scheduler;
pub use scheduler::{Scheduler, WeakScheduler};


bitflags! {
    /// Per-submission options.
    ///
    /// Passed to [`Scheduler::schedule_task_with`]. Submissions without
    /// explicit options use the scheduler's defaults, see
    /// [`Builder::default_submit_opts`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubmitOpts: u8 {
        /// Ask the host to call its idle routines soon, through the
        /// configured [`IdleNotifier`], so the task does not wait for the
        /// next natural idle tick.
        ///
        /// [`IdleNotifier`]: crate::IdleNotifier
        const REQUEST_IDLE = 1;
    }
}

impl Default for SubmitOpts {
    fn default() -> Self {
        SubmitOpts::REQUEST_IDLE
    }
}

/// Outcome of one [`Scheduler::execute_tasks`] call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    /// Callables that ran, including the ones that panicked.
    pub executed: usize,

    /// Callables that ran and panicked. The panic went to their handle.
    pub panicked: usize,

    /// Tasks aborted while queued. Their callables never ran.
    pub cancelled: usize,
}

impl DrainReport {
    /// Number of tasks taken off the queue.
    pub fn total(&self) -> usize {
        self.executed + self.cancelled
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub(crate) fn record(&mut self, completion: Completion) {
        match completion {
            Completion::Complete => self.executed += 1,
            Completion::Panicked => {
                self.executed += 1;
                self.panicked += 1;
            }
            Completion::Cancelled => self.cancelled += 1,
        }
    }
}
