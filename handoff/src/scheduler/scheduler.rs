use crate::context::MainThread;
use crate::queue::TaskQueue;
use crate::scheduler::{Builder, DrainReport, Error, SchedulerConfig, SubmitOpts};
use crate::task::{self, Id, Task, TaskError, TaskHandle, new_task};
use crate::utils::ScopeGuard;
use std::fmt;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread::{self, ThreadId};
use tracing::{debug, trace, warn};

/// Runs closures submitted from any thread on one main thread.
///
/// A `Scheduler` is a cheap handle: clone it into every thread that needs to
/// submit work. The main thread calls [`execute_tasks`] from the host's idle
/// callback (usually through an [`IdlePump`]), which runs everything queued
/// so far, in submission order, one task at a time.
///
/// [`shutdown`] drops the queued tasks and their handles resolve to an
/// abandoned [`TaskError`]. Dropping the last handle does the same, but only
/// if no queued task owns a clone itself: a task capturing a `Scheduler`
/// keeps the queue alive. Tasks that submit follow-up work should capture a
/// [`WeakScheduler`] from [`downgrade`] instead.
///
/// [`shutdown`]: Scheduler::shutdown
/// [`downgrade`]: Scheduler::downgrade
/// [`execute_tasks`]: Scheduler::execute_tasks
/// [`IdlePump`]: crate::IdlePump
#[derive(Clone)]
pub struct Scheduler {
    shared: Arc<Shared>,
}

struct Shared {
    cfg: SchedulerConfig,

    /// Set once, never changed.
    main_thread: OnceLock<ThreadId>,

    queue: TaskQueue<Task>,

    /// Set while the main thread runs a batch. Only touched by the main
    /// thread.
    draining: AtomicBool,

    shutdown: AtomicBool,
}

impl Scheduler {
    /// Returns a new [`Builder`].
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn new(cfg: SchedulerConfig) -> Self {
        let main_thread = OnceLock::new();
        if let Some(id) = cfg.main_thread {
            let _ = main_thread.set(id);
        }

        let queue = TaskQueue::with_capacity(cfg.initial_capacity);

        Self {
            shared: Arc::new(Shared {
                cfg,
                main_thread,
                queue,
                draining: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    /// Returns a handle that does not keep the scheduler alive.
    pub fn downgrade(&self) -> WeakScheduler {
        WeakScheduler {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.cfg.name
    }

    /// Returns the main thread, or `None` if the scheduler binds on first
    /// drain and nobody drained yet.
    pub fn main_thread_id(&self) -> Option<ThreadId> {
        self.shared.main_thread.get().copied()
    }

    /// Checks whether the calling thread is this scheduler's main thread.
    ///
    /// Always `false` while the scheduler is unbound.
    pub fn is_main_thread(&self) -> bool {
        self.shared.main_thread.get() == Some(&thread::current().id())
    }

    /// Returns the main-thread token if called on the main thread.
    pub fn main_thread(&self) -> Option<MainThread<'_>> {
        self.is_main_thread().then(MainThread::new)
    }

    /// Binds the scheduler to the calling thread if it is not bound yet.
    ///
    /// Returns [`Error::NotMainThread`] if it is already bound to another
    /// thread. Binding to the thread it is already bound to is a no-op.
    pub fn bind_main_thread(&self) -> Result<(), Error> {
        let current = thread::current().id();

        if self.shared.main_thread.set(current).is_ok() {
            debug!(scheduler = self.name(), thread = ?current, "bound main thread");
            return Ok(());
        }

        match self.shared.main_thread.get() {
            Some(&expected) if expected != current => Err(Error::NotMainThread {
                expected,
                actual: current,
            }),
            _ => Ok(()),
        }
    }

    /// Queues `func` for the main thread and returns a handle to its result.
    ///
    /// Never blocks and never runs `func` inline, even on the main thread.
    /// Uses the scheduler's default [`SubmitOpts`].
    pub fn schedule_task<F, T>(&self, func: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.schedule_task_with(self.shared.cfg.default_submit_opts, func)
    }

    /// Like [`schedule_task`] with explicit options, e.g.
    /// `SubmitOpts::empty()` to skip the idle request for a batch of
    /// submissions but the last.
    ///
    /// [`schedule_task`]: Scheduler::schedule_task
    pub fn schedule_task_with<F, T>(&self, opts: SubmitOpts, func: F) -> TaskHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit(opts, move |_| func())
    }

    /// Like [`schedule_task`], handing the callable a [`MainThread`] token
    /// so it can call functions that demand one.
    ///
    /// [`schedule_task`]: Scheduler::schedule_task
    pub fn schedule_task_on_main<F, T>(&self, func: F) -> TaskHandle<T>
    where
        F: for<'m> FnOnce(MainThread<'m>) -> T + Send + 'static,
        T: Send + 'static,
    {
        self.submit(self.shared.cfg.default_submit_opts, func)
    }

    /// Queues `func` without a handle. If it panics, the panic is logged.
    pub fn post<F>(&self, func: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let _ = self.schedule_task(func);
    }

    /// Runs `func` on the main thread and returns its result.
    ///
    /// On the main thread, including from inside a running task, `func`
    /// runs inline right away. Anywhere else it is queued and the calling
    /// thread blocks until the main thread got to it.
    ///
    /// A panic in `func` is returned as a [`TaskError`] on both paths.
    pub fn schedule_or_execute<F, T>(&self, func: F) -> task::Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.is_main_thread() {
            let id = Id::next();
            trace!(scheduler = self.name(), task.id = %id, "executing inline");

            return panic::catch_unwind(panic::AssertUnwindSafe(func))
                .map_err(|payload| TaskError::panic(id, payload));
        }

        self.schedule_task(func).get()
    }

    fn submit<F, T>(&self, opts: SubmitOpts, func: F) -> TaskHandle<T>
    where
        F: for<'m> FnOnce(MainThread<'m>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (task, handle) = new_task(func);
        let id = task.id();

        if self.is_shutdown() {
            warn!(
                scheduler = self.name(),
                task.id = %id,
                "scheduler is shut down, task abandoned"
            );
            return handle;
        }

        let pending = self.shared.queue.push(task);
        debug!(scheduler = self.name(), task.id = %id, pending, "task submitted");

        let threshold = self.shared.cfg.warn_pending_threshold;
        if threshold.checked_add(1) == Some(pending) {
            warn!(
                scheduler = self.name(),
                pending,
                threshold,
                "pending tasks above threshold, is the host calling idle routines?"
            );
        }

        if opts.contains(SubmitOpts::REQUEST_IDLE)
            && let Some(notifier) = &self.shared.cfg.idle_notifier
        {
            notifier.request_idle();
        }

        handle
    }

    /// Runs every task queued so far, in submission order.
    ///
    /// Must be called on the main thread, which is bound here if the
    /// scheduler was built with [`bind_on_first_drain`]. Tasks submitted
    /// while the batch runs, including by the tasks themselves, wait for the
    /// next call.
    ///
    /// A panicking task never interrupts the batch: the panic goes to its
    /// handle and is counted in the returned report.
    ///
    /// # Errors
    ///
    /// - [`Error::NotMainThread`] when called on another thread. Nothing
    ///   runs.
    /// - [`Error::ReentrantDrain`] when called from inside a running task.
    /// - [`Error::Shutdown`] once the scheduler is shut down.
    ///
    /// [`bind_on_first_drain`]: crate::Builder::bind_on_first_drain
    #[tracing::instrument(level = "trace", skip(self), fields(scheduler = %self.name()))]
    pub fn execute_tasks(&self) -> Result<DrainReport, Error> {
        if let Err(err) = self.bind_main_thread() {
            warn!(%err, "drain attempted off the main thread");
            return Err(err);
        }

        if self.is_shutdown() {
            self.abandon_pending();
            return Err(Error::Shutdown);
        }

        if self.shared.draining.swap(true, Ordering::Relaxed) {
            return Err(Error::ReentrantDrain);
        }
        let _draining = ScopeGuard::new(|| self.shared.draining.store(false, Ordering::Relaxed));

        let mut report = DrainReport::default();

        let tasks = self.shared.queue.drain_all();
        if tasks.is_empty() {
            return Ok(report);
        }

        let main = MainThread::new();
        for task in tasks {
            let id = task.id();
            let completion = task.run(main);
            trace!(task.id = %id, ?completion, "task done");
            report.record(completion);
        }

        debug!(
            executed = report.executed,
            panicked = report.panicked,
            cancelled = report.cancelled,
            "drained task queue"
        );

        Ok(report)
    }

    /// Stops accepting work and drops every pending task.
    ///
    /// Handles of dropped tasks, and of anything submitted afterwards,
    /// resolve to an abandoned [`TaskError`]. A batch already taken off the
    /// queue by a running [`execute_tasks`] still completes.
    ///
    /// [`execute_tasks`]: Scheduler::execute_tasks
    pub fn shutdown(&self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        debug!(scheduler = self.name(), "shutting down");
        self.abandon_pending();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    /// Number of tasks waiting for the next drain.
    pub fn pending_tasks(&self) -> usize {
        self.shared.queue.len()
    }

    fn abandon_pending(&self) {
        let tasks = self.shared.queue.drain_all();
        if !tasks.is_empty() {
            warn!(
                scheduler = self.name(),
                abandoned = tasks.len(),
                "dropping pending tasks"
            );
        }
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.name())
            .field("main_thread", &self.main_thread_id())
            .field("pending", &self.pending_tasks())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

/// Non-owning handle to a [`Scheduler`], obtained from
/// [`Scheduler::downgrade`].
///
/// Queued tasks that need the scheduler should hold one of these, so the
/// queue never owns itself.
#[derive(Clone)]
pub struct WeakScheduler {
    shared: Weak<Shared>,
}

impl WeakScheduler {
    /// Returns the scheduler if any owning handle is still alive.
    pub fn upgrade(&self) -> Option<Scheduler> {
        self.shared.upgrade().map(|shared| Scheduler { shared })
    }
}

impl fmt::Debug for WeakScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakScheduler")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}
