pub(crate) mod scope_guard;
pub(crate) use scope_guard::ScopeGuard;

pub(crate) mod sync_wrapper;
pub(crate) use sync_wrapper::SyncWrapper;
