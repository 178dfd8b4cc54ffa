//! Simulates a host application that only calls plugins from its idle loop,
//! and a script thread that needs host data and posts an alert back.
//!
//! Run with: cargo run -p handoff --example host_sim

use anyhow::Result;
use handoff::{Builder, IdleHook, IdlePump, IdleRegistry, MainThread, Scheduler};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Host API. Takes the main-thread token because the real one would crash
/// anywhere else.
fn most_recent_comp(_main: MainThread<'_>) -> String {
    "Comp 1".to_string()
}

fn alert(_main: MainThread<'_>, msg: &str) {
    println!("[host] alert: {msg}");
}

#[derive(Default)]
struct Host {
    idle_hooks: Vec<IdleHook>,
}

impl IdleRegistry for Host {
    type Error = Infallible;

    fn register_idle_hook(&mut self, hook: IdleHook) -> Result<(), Infallible> {
        self.idle_hooks.push(hook);
        Ok(())
    }
}

impl Host {
    fn run(&mut self, done: &AtomicBool) {
        let mut ticks = 0;
        while !done.load(Ordering::Acquire) {
            ticks += 1;
            self.idle_hooks.iter_mut().for_each(|hook| hook());
            thread::sleep(Duration::from_millis(10));
        }
        println!("[host] exiting after {ticks} idle ticks");
    }
}

/// Background work: fetch host data, then show an alert built from it.
fn run_script(scheduler: &Scheduler) -> Result<()> {
    println!("[script] asking for the most recent comp");
    let comp = scheduler.schedule_task_on_main(most_recent_comp);
    let name = comp.get()?;
    println!("[script] got {name:?}");

    let shown =
        scheduler.schedule_task_on_main(move |main| alert(main, &format!("Active comp: {name}")));
    shown.get()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut host = Host::default();

    let scheduler = Builder::new()
        .name("host-sim")
        .idle_notifier(|| println!("[host] idle requested"))
        .try_build()?;
    IdlePump::new(scheduler.clone())?.register(&mut host)?;

    let done = Arc::new(AtomicBool::new(false));

    let script = {
        let scheduler = scheduler.clone();
        let done = done.clone();
        thread::spawn(move || {
            let res = run_script(&scheduler);
            done.store(true, Ordering::Release);
            res
        })
    };

    host.run(&done);

    match script.join() {
        Ok(res) => res,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}
