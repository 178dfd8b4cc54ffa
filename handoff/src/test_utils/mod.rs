use crate::idle::IdleNotifier;
use crate::scheduler::Scheduler;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Give up on a condition after this long instead of hanging the test run.
const PUMP_TIMEOUT: Duration = Duration::from_secs(10);

/// Idle notifier counting how often the scheduler asked for idle time.
///
/// Clones share the count, so a test keeps one and hands another to the
/// builder.
#[derive(Debug, Default, Clone)]
pub(crate) struct CountingNotifier {
    count: Arc<AtomicUsize>,
}

impl CountingNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl IdleNotifier for CountingNotifier {
    fn request_idle(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Plays the host's idle loop on the current thread until `cond` holds.
///
/// Returns the number of tasks taken off the queue.
pub(crate) fn pump_until(scheduler: &Scheduler, cond: impl Fn() -> bool) -> usize {
    let deadline = Instant::now() + PUMP_TIMEOUT;
    let mut drained = 0;

    loop {
        drained += match scheduler.execute_tasks() {
            Ok(report) => report.total(),
            Err(e) => panic!("drain failed: {e}"),
        };

        if cond() {
            return drained;
        }

        assert!(Instant::now() < deadline, "condition not met after {PUMP_TIMEOUT:?}");
        thread::sleep(Duration::from_millis(1));
    }
}
