//! Synchronization primitives abstraction for loom testing.
//!
//! When compiled with `--cfg loom`, the task queue is built on loom's types so
//! its push/drain interleavings can be model checked. Otherwise it uses
//! `parking_lot`.

use std::ops::DerefMut;

#[cfg(not(loom))]
pub(crate) struct Mutex<T>(parking_lot::Mutex<T>);

#[cfg(not(loom))]
impl<T> Mutex<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(parking_lot::Mutex::new(value))
    }

    pub(crate) fn lock(&self) -> impl DerefMut<Target = T> + '_ {
        self.0.lock()
    }
}

#[cfg(loom)]
pub(crate) struct Mutex<T>(loom::sync::Mutex<T>);

#[cfg(loom)]
impl<T> Mutex<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(loom::sync::Mutex::new(value))
    }

    pub(crate) fn lock(&self) -> impl DerefMut<Target = T> + '_ {
        // Poisoning only happens when a model thread panicked, which already
        // fails the model.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
