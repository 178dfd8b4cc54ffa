//! Glue between a host's idle callbacks and a [`Scheduler`].
//!
//! Hosts that own the main thread hand control to plugins from an "idle"
//! callback they call whenever they have nothing better to do. An
//! [`IdlePump`] turns each of those calls into one
//! [`Scheduler::execute_tasks`]. Hosts that can be asked to call their idle
//! routines soon are wired in through an [`IdleNotifier`].

use crate::scheduler::{DrainReport, Error, Scheduler};
use tracing::{error, trace};

/// Host hook asking for idle routines to be called soon.
///
/// Called on the submitting thread, right after a task with
/// [`SubmitOpts::REQUEST_IDLE`] was queued, outside of any scheduler lock.
/// It must be cheap and must not block on the main thread.
///
/// Any `Fn() + Send + Sync` closure is a notifier.
///
/// [`SubmitOpts::REQUEST_IDLE`]: crate::SubmitOpts::REQUEST_IDLE
pub trait IdleNotifier: Send + Sync {
    fn request_idle(&self);
}

impl<F> IdleNotifier for F
where
    F: Fn() + Send + Sync,
{
    fn request_idle(&self) {
        self()
    }
}

/// Callback handed to the host, called on the main thread on every idle
/// tick.
pub type IdleHook = Box<dyn FnMut() + 'static>;

/// Host side of the idle contract: something that accepts an [`IdleHook`]
/// and calls it on the main thread whenever it is idle.
pub trait IdleRegistry {
    type Error;

    fn register_idle_hook(&mut self, hook: IdleHook) -> Result<(), Self::Error>;
}

/// Drains a scheduler from the host's idle callback.
///
/// ```
/// use handoff::{Builder, IdlePump};
///
/// # fn main() -> anyhow::Result<()> {
/// let scheduler = Builder::new().try_build()?;
/// let mut pump = IdlePump::new(scheduler.clone())?;
///
/// let handle = scheduler.schedule_task(|| 1 + 1);
///
/// // Called by the host whenever it is idle.
/// let report = pump.on_idle()?;
/// assert_eq!(report.executed, 1);
/// assert_eq!(handle.get()?, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct IdlePump {
    scheduler: Scheduler,

    /// Number of `on_idle` calls.
    ticks: u64,

    /// Number of tasks taken off the queue over all ticks.
    drained: u64,
}

impl IdlePump {
    /// Creates a pump for `scheduler`, binding the calling thread as its main
    /// thread if it is not bound yet.
    ///
    /// Fails with [`Error::NotMainThread`] if the scheduler is bound to
    /// another thread.
    pub fn new(scheduler: Scheduler) -> Result<Self, Error> {
        scheduler.bind_main_thread()?;

        Ok(Self {
            scheduler,
            ticks: 0,
            drained: 0,
        })
    }

    /// Runs one idle tick: executes every task queued so far.
    #[tracing::instrument(level = "trace", skip(self), fields(tick = self.ticks + 1))]
    pub fn on_idle(&mut self) -> Result<DrainReport, Error> {
        self.ticks += 1;

        let report = self.scheduler.execute_tasks()?;
        self.drained += report.total() as u64;

        Ok(report)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn drained(&self) -> u64 {
        self.drained
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Turns the pump into a callback for the host. The callback never
    /// panics; drain errors are logged.
    pub fn into_hook(mut self) -> IdleHook {
        Box::new(move || match self.on_idle() {
            Ok(_) => {}
            Err(Error::Shutdown) => trace!("scheduler shut down, idle tick ignored"),
            Err(err) => error!(%err, "idle drain failed"),
        })
    }

    /// Installs the pump into the host's idle callback registry.
    pub fn register<R>(self, registry: &mut R) -> Result<(), R::Error>
    where
        R: IdleRegistry + ?Sized,
    {
        registry.register_idle_hook(self.into_hook())
    }
}
