//! Per-key lookup serialization.
//!
//! Callers that miss the cache for the same key take the same async lock, so
//! only the first runs the remote lookup; the rest find its result in the
//! cache once they acquire the lock. Lock entries are dropped when no caller
//! holds them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct KeyedLocks {
    locks: StdMutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl KeyedLocks {
    /// The lock shared by every current caller for `key`
    pub(crate) fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(key).and_then(Weak::upgrade) {
            return lock;
        }
        locks.retain(|_, lock| lock.strong_count() > 0);
        let lock = Arc::new(Mutex::new(()));
        locks.insert(key.to_string(), Arc::downgrade(&lock));
        lock
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_shares_lock() {
        let locks = KeyedLocks::default();
        let a = locks.lock_for("k");
        let b = locks.lock_for("k");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &locks.lock_for("other")));
    }

    #[test]
    fn test_released_locks_are_pruned() {
        let locks = KeyedLocks::default();
        drop(locks.lock_for("a"));
        drop(locks.lock_for("b"));
        let _held = locks.lock_for("c");
        assert_eq!(locks.tracked(), 1);
    }
}
