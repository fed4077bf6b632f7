use std::sync::{Mutex, MutexGuard};

/// Lock `lock`, taking the data back out of a poisoned mutex.
///
/// A task that panicked mid-clip poisons the shared runner. Its only state
/// the runner relies on is the default sample rate, which is a plain `u32`
/// and never half-written, so later callers keep using it instead of
/// inheriting the panic. `context` names the operation in the warning.
pub(crate) fn lock_or_recover<'a, T>(lock: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        tracing::warn!(operation = context, "runner mutex poisoned by a panicking task; recovering");
        poisoned.into_inner()
    })
}
