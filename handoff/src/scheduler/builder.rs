use crate::idle::IdleNotifier;
use crate::queue::DEFAULT_CAPACITY;
use crate::scheduler::{Scheduler, SubmitOpts};
use anyhow::{Result, anyhow};
use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Name used in log fields when none is configured.
const DEFAULT_NAME: &str = "handoff";

/// Queue depth past which submissions start logging warnings. Work is never
/// rejected because of depth.
const WARN_PENDING_THRESHOLD: usize = 1024;

/// Which thread a scheduler treats as its main thread.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum MainThreadBinding {
    /// The thread calling [`Builder::try_build`].
    #[default]
    Current,

    /// A specific thread, e.g. when the scheduler is built on a plugin's
    /// loader thread on behalf of the host's main thread.
    Thread(ThreadId),

    /// Whichever thread first calls [`Scheduler::execute_tasks`] or
    /// [`Scheduler::bind_main_thread`].
    ///
    /// Until then every thread is treated as a background thread, so
    /// [`Scheduler::schedule_or_execute`] on the future main thread would
    /// block forever. Bind early.
    FirstDrain,
}

/// Configures and builds a [`Scheduler`].
///
/// ```
/// use handoff::{Builder, SubmitOpts};
///
/// # fn main() -> anyhow::Result<()> {
/// let scheduler = Builder::new()
///     .name("my-plugin")
///     .warn_pending_threshold(64)
///     .idle_notifier(|| { /* ask the host to call idle routines */ })
///     .default_submit_opts(SubmitOpts::REQUEST_IDLE)
///     .try_build()?;
///
/// assert_eq!(scheduler.name(), "my-plugin");
/// assert!(scheduler.is_main_thread());
/// # Ok(())
/// # }
/// ```
pub struct Builder {
    /// Scheduler name, attached to every log line.
    name: String,

    main_thread: MainThreadBinding,

    /// Capacity of the queue buffer swapped in after each drain.
    initial_capacity: usize,

    warn_pending_threshold: usize,

    /// Host hook asking for idle routines to be called soon.
    idle_notifier: Option<Arc<dyn IdleNotifier>>,

    /// Options used by every submission that does not pass its own.
    default_submit_opts: SubmitOpts,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            main_thread: MainThreadBinding::default(),
            initial_capacity: DEFAULT_CAPACITY,
            warn_pending_threshold: WARN_PENDING_THRESHOLD,
            idle_notifier: None,
            default_submit_opts: SubmitOpts::default(),
        }
    }

    /// Sets the scheduler name used in log fields.
    ///
    /// The default name is "handoff".
    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.name = val.into();
        self
    }

    /// Binds the scheduler to `id` instead of the building thread.
    pub fn main_thread(mut self, id: ThreadId) -> Self {
        self.main_thread = MainThreadBinding::Thread(id);
        self
    }

    /// Defers binding to the first thread that drains the queue. See
    /// [`MainThreadBinding::FirstDrain`].
    pub fn bind_on_first_drain(mut self) -> Self {
        self.main_thread = MainThreadBinding::FirstDrain;
        self
    }

    pub fn main_thread_binding(mut self, binding: MainThreadBinding) -> Self {
        self.main_thread = binding;
        self
    }

    /// Sets the capacity of the queue buffer. The buffer is swapped for a
    /// fresh one of this capacity every time a non-empty queue is drained.
    ///
    /// Defaults to 32.
    #[track_caller]
    pub fn initial_capacity(mut self, val: usize) -> Self {
        assert!(val.is_power_of_two(), "initial_capacity must be a power of two");
        self.initial_capacity = val;
        self
    }

    /// Sets the queue depth above which submissions log a warning. This
    /// usually means the host stopped calling its idle routines.
    ///
    /// Defaults to 1024.
    #[track_caller]
    pub fn warn_pending_threshold(mut self, val: usize) -> Self {
        assert!(val > 0, "warn_pending_threshold must be greater than 0");
        self.warn_pending_threshold = val;
        self
    }

    /// Sets the hook called after submissions that carry
    /// [`SubmitOpts::REQUEST_IDLE`].
    pub fn idle_notifier(mut self, notifier: impl IdleNotifier + 'static) -> Self {
        self.idle_notifier = Some(Arc::new(notifier));
        self
    }

    /// Sets the options of submissions that do not pass their own.
    ///
    /// Defaults to [`SubmitOpts::REQUEST_IDLE`].
    pub fn default_submit_opts(mut self, opts: SubmitOpts) -> Self {
        self.default_submit_opts = opts;
        self
    }

    /// Creates the configured `Scheduler`.
    ///
    /// The returned scheduler accepts submissions right away. They run the
    /// first time its main thread calls [`Scheduler::execute_tasks`].
    pub fn try_build(self) -> Result<Scheduler> {
        let cfg = SchedulerConfig::try_from(self)?;
        Ok(Scheduler::new(cfg))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("name", &self.name)
            .field("main_thread", &self.main_thread)
            .field("initial_capacity", &self.initial_capacity)
            .field("warn_pending_threshold", &self.warn_pending_threshold)
            .field("idle_notifier", &self.idle_notifier.is_some())
            .field("default_submit_opts", &self.default_submit_opts)
            .finish()
    }
}

// Export the builder as a validated config consumed by the scheduler.
#[derive(Clone)]
pub(crate) struct SchedulerConfig {
    pub(crate) name: String,

    /// `None` binds on first drain.
    pub(crate) main_thread: Option<ThreadId>,

    pub(crate) initial_capacity: usize,
    pub(crate) warn_pending_threshold: usize,
    pub(crate) idle_notifier: Option<Arc<dyn IdleNotifier>>,
    pub(crate) default_submit_opts: SubmitOpts,
}

/// Used by the global scheduler, which cannot know its main thread upfront.
impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            name: DEFAULT_NAME.to_owned(),
            main_thread: None,
            initial_capacity: DEFAULT_CAPACITY,
            warn_pending_threshold: WARN_PENDING_THRESHOLD,
            idle_notifier: None,
            default_submit_opts: SubmitOpts::default(),
        }
    }
}

impl SchedulerConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("scheduler name cannot be empty"));
        }

        Ok(())
    }
}

impl TryFrom<Builder> for SchedulerConfig {
    type Error = anyhow::Error;

    fn try_from(builder: Builder) -> Result<Self, Self::Error> {
        let main_thread = match builder.main_thread {
            MainThreadBinding::Current => Some(thread::current().id()),
            MainThreadBinding::Thread(id) => Some(id),
            MainThreadBinding::FirstDrain => None,
        };

        let cfg = SchedulerConfig {
            name: builder.name,
            main_thread,
            initial_capacity: builder.initial_capacity,
            warn_pending_threshold: builder.warn_pending_threshold,
            idle_notifier: builder.idle_notifier,
            default_submit_opts: builder.default_submit_opts,
        };

        cfg.validate()?;

        Ok(cfg)
    }
}

impl fmt::Debug for SchedulerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerConfig")
            .field("name", &self.name)
            .field("main_thread", &self.main_thread)
            .field("initial_capacity", &self.initial_capacity)
            .field("warn_pending_threshold", &self.warn_pending_threshold)
            .field("idle_notifier", &self.idle_notifier.is_some())
            .field("default_submit_opts", &self.default_submit_opts)
            .finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(SchedulerConfig: Send, Sync, Clone);
    assert_impl_all!(Builder: Send);

    #[test]
    fn test_defaults() -> Result<()> {
        let cfg = SchedulerConfig::try_from(Builder::new())?;

        assert_eq!(cfg.name, "handoff");
        assert_eq!(cfg.main_thread, Some(thread::current().id()));
        assert_eq!(cfg.initial_capacity, 32);
        assert_eq!(cfg.warn_pending_threshold, 1024);
        assert!(cfg.idle_notifier.is_none());
        assert_eq!(cfg.default_submit_opts, SubmitOpts::REQUEST_IDLE);
        Ok(())
    }

    #[test]
    fn test_main_thread_binding() -> Result<()> {
        let other = thread::spawn(|| thread::current().id()).join().unwrap();

        let cfg = SchedulerConfig::try_from(Builder::new().main_thread(other))?;
        assert_eq!(cfg.main_thread, Some(other));

        let cfg = SchedulerConfig::try_from(Builder::new().bind_on_first_drain())?;
        assert_eq!(cfg.main_thread, None);

        let cfg = SchedulerConfig::try_from(
            Builder::new()
                .bind_on_first_drain()
                .main_thread_binding(MainThreadBinding::Current),
        )?;
        assert_eq!(cfg.main_thread, Some(thread::current().id()));
        Ok(())
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = Builder::new().name("  ").try_build().unwrap_err();
        assert!(err.to_string().contains("name cannot be empty"));
    }

    #[test]
    #[should_panic(expected = "initial_capacity must be a power of two")]
    fn test_capacity_must_be_power_of_two() {
        let _ = Builder::new().initial_capacity(24);
    }

    #[test]
    #[should_panic(expected = "warn_pending_threshold must be greater than 0")]
    fn test_threshold_must_be_positive() {
        let _ = Builder::new().warn_pending_threshold(0);
    }
}
