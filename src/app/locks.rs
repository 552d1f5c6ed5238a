use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::Keyword;

/// Serializes runs that share a sanitized keyword.
///
/// Runs for different keywords never block each other.
#[derive(Debug, Default)]
pub struct KeywordLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeywordLocks {
    /// Run `f` while holding the lock for `keyword`.
    pub fn with_lock<T>(&self, keyword: &Keyword, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(&keyword.sanitized());
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop slots nobody else holds.
        slots.retain(|k, slot| k == key || Arc::strong_count(slot) > 1);
        slots.entry(key.to_string()).or_default().clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
