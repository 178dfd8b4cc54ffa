//! Hand closures to a host application's main thread from any other thread.
//!
//! Many plugin hosts only allow their API to be touched from one privileged
//! thread, and only hand control to plugins from cooperative idle callbacks.
//! `handoff` queues work submitted from background threads (script
//! interpreters, worker pools) and runs it on the main thread the next time
//! the host goes idle, delivering each result back through a [`TaskHandle`].
//!
//! ```no_run
//! use handoff::{Builder, IdlePump};
//!
//! # fn main() -> anyhow::Result<()> {
//! // On the host's main thread, while the plugin initializes:
//! let scheduler = Builder::new().name("my-plugin").try_build()?;
//! let mut pump = IdlePump::new(scheduler.clone())?;
//!
//! // Anywhere else:
//! let worker = std::thread::spawn(move || scheduler.schedule_or_execute(|| 6 * 7));
//!
//! // Back on the main thread, from the host's idle callback:
//! while !worker.is_finished() {
//!     pump.on_idle()?;
//! }
//! # assert_eq!(worker.join().unwrap()?, 42);
//! # Ok(())
//! # }
//! ```
//!
//! [`TaskHandle`]: task::TaskHandle

mod context;
pub use context::MainThread;

pub mod idle;
pub use idle::{IdleHook, IdleNotifier, IdlePump, IdleRegistry};

mod queue;

pub mod scheduler;
pub use scheduler::{
    Builder, DrainReport, Error, MainThreadBinding, Scheduler, SubmitOpts, WeakScheduler,
    execute_tasks, global, post, schedule_or_execute, schedule_task,
};

mod sync;

pub mod task;
pub use task::{AbortHandle, TaskError, TaskHandle};

mod utils;

#[cfg(all(test, not(loom)))]
mod test_utils;
