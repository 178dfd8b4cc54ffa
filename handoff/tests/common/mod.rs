//! A fake host application: a main thread that owns some state only it may
//! touch, and calls its registered idle hooks in a loop.

#![allow(dead_code)]

use handoff::{IdleHook, IdleRegistry};
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const RUN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct Project {
    comps: Vec<String>,
    alerts: Vec<String>,
}

thread_local! {
    // Only set on the host's main thread.
    static PROJECT: RefCell<Option<Project>> = const { RefCell::new(None) };
}

fn with_project<R>(f: impl FnOnce(&mut Project) -> R) -> R {
    PROJECT.with(|p| {
        let mut p = p.borrow_mut();
        let project = p.as_mut().expect("host API called off the main thread");
        f(project)
    })
}

/// Host API: most recently created composition.
pub fn most_recent_comp() -> Option<String> {
    with_project(|p| p.comps.last().cloned())
}

/// Host API: shows a message to the user.
pub fn alert(msg: impl Into<String>) {
    with_project(|p| p.alerts.push(msg.into()));
}

pub struct FakeHost {
    hooks: Vec<IdleHook>,
    idle_requests: Arc<AtomicUsize>,
    ticks: usize,
}

impl FakeHost {
    /// Installs the host on the calling thread, which becomes its main thread.
    pub fn new(comps: &[&str]) -> Self {
        PROJECT.with(|p| {
            *p.borrow_mut() = Some(Project {
                comps: comps.iter().map(|c| c.to_string()).collect(),
                alerts: Vec::new(),
            })
        });

        Self {
            hooks: Vec::new(),
            idle_requests: Arc::new(AtomicUsize::new(0)),
            ticks: 0,
        }
    }

    /// Notifier handed to the scheduler: "cause idle routines to be called".
    pub fn idle_notifier(&self) -> impl Fn() + Send + Sync + 'static {
        let requests = self.idle_requests.clone();
        move || {
            requests.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        with_project(|p| p.alerts.clone())
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn tick(&mut self) {
        self.ticks += 1;
        self.hooks.iter_mut().for_each(|hook| hook());
    }

    /// Ticks on a timer until `cond` holds.
    pub fn run_until(&mut self, cond: impl Fn(&Self) -> bool) {
        let deadline = Instant::now() + RUN_TIMEOUT;
        while !cond(self) {
            assert!(Instant::now() < deadline, "host loop timed out");
            self.tick();
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Ticks only when an idle request is pending, like a host that sleeps
    /// until it is asked to call its idle routines.
    pub fn run_on_request_until(&mut self, cond: impl Fn(&Self) -> bool) {
        let deadline = Instant::now() + RUN_TIMEOUT;
        while !cond(self) {
            assert!(Instant::now() < deadline, "host loop timed out");
            if self.idle_requests.swap(0, Ordering::SeqCst) > 0 {
                self.tick();
            } else {
                thread::yield_now();
            }
        }
    }
}

impl IdleRegistry for FakeHost {
    type Error = std::convert::Infallible;

    fn register_idle_hook(&mut self, hook: IdleHook) -> Result<(), Self::Error> {
        self.hooks.push(hook);
        Ok(())
    }
}

impl Drop for FakeHost {
    fn drop(&mut self) {
        PROJECT.with(|p| p.borrow_mut().take());
    }
}
