//! A wrapper that makes any `Send` value `Sync` by never handing out shared
//! references to it.
//!
//! `TaskError` stores the panic payload of a task in one of these so the
//! error itself stays `Send + Sync` and can travel inside `anyhow::Error`.

use std::any::Any;

pub(crate) struct SyncWrapper<T> {
    value: T,
}

// Safety: there is no way to get a `&T` out of a `&SyncWrapper<T>`, so sharing
// the wrapper across threads never shares the inner value.
unsafe impl<T: Send> Sync for SyncWrapper<T> {}

impl<T> SyncWrapper<T> {
    pub(crate) fn new(value: T) -> Self {
        Self { value }
    }

    pub(crate) fn into_inner(self) -> T {
        self.value
    }
}

impl SyncWrapper<Box<dyn Any + Send>> {
    /// Downcasts to a type that is itself `Sync`, so handing out a shared
    /// reference to it is sound.
    pub(crate) fn downcast_ref_sync<T: Any + Sync>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}
