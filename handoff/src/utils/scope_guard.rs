/// Runs a closure when it goes out of scope, including during unwinding.
///
/// The drain loop uses it to clear its "draining" marker no matter how the
/// loop exits.
pub(crate) struct ScopeGuard<F: FnOnce()> {
    // Taken on drop so the closure runs at most once.
    closure: Option<F>,
}

impl<F: FnOnce()> ScopeGuard<F> {
    pub(crate) fn new(closure: F) -> Self {
        ScopeGuard {
            closure: Some(closure),
        }
    }
}

impl<F: FnOnce()> Drop for ScopeGuard<F> {
    fn drop(&mut self) {
        if let Some(closure) = self.closure.take() {
            closure();
        }
    }
}
