//! Drain benchmarks: idle ticks with nothing to do, and full batches.
//!
//! Run with: cargo bench -p handoff

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use handoff::{Builder, Scheduler, SubmitOpts};

fn scheduler() -> Scheduler {
    Builder::new()
        .name("bench")
        .default_submit_opts(SubmitOpts::empty())
        .try_build()
        .expect("failed to build scheduler")
}

fn drain_empty(c: &mut Criterion) {
    let scheduler = scheduler();
    c.bench_function("drain_empty", |b| {
        b.iter(|| black_box(scheduler.execute_tasks().unwrap()));
    });
}

fn submit_and_drain_64(c: &mut Criterion) {
    let scheduler = scheduler();
    c.bench_function("submit_and_drain_64", |b| {
        b.iter(|| {
            let handles = (0..64)
                .map(|i| scheduler.schedule_task(move || black_box(i)))
                .collect::<Vec<_>>();
            scheduler.execute_tasks().unwrap();
            for h in handles {
                black_box(h.get().unwrap());
            }
        });
    });
}

fn post_and_drain_64(c: &mut Criterion) {
    let scheduler = scheduler();
    c.bench_function("post_and_drain_64", |b| {
        b.iter(|| {
            for i in 0..64 {
                scheduler.post(move || {
                    black_box(i);
                });
            }
            scheduler.execute_tasks().unwrap();
        });
    });
}

fn schedule_or_execute_inline(c: &mut Criterion) {
    let scheduler = scheduler();
    c.bench_function("schedule_or_execute_inline", |b| {
        b.iter(|| black_box(scheduler.schedule_or_execute(|| 42).unwrap()));
    });
}

criterion_group!(
    benches,
    drain_empty,
    submit_and_drain_64,
    post_and_drain_64,
    schedule_or_execute_inline,
);
criterion_main!(benches);
