//! Change signal for discovery notifications.
//!
//! Remembers the last value seen for each logical key and reports whether a
//! new observation differs from it. Used only to decide whether to log; it
//! never affects resolution results.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct ChangeMonitor {
    last_seen: Mutex<HashMap<String, String>>,
}

impl ChangeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `key`; true on the first observation or when it differs from the last one
    pub fn has_changed(&self, key: &str, value: &str) -> bool {
        let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        match last_seen.get(key) {
            Some(previous) if previous == value => false,
            _ => {
                last_seen.insert(key.to_string(), value.to_string());
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_is_a_change() {
        let monitor = ChangeMonitor::new();
        assert!(monitor.has_changed("image", "v1"));
        assert!(!monitor.has_changed("image", "v1"));
    }

    #[test]
    fn test_new_value_is_a_change() {
        let monitor = ChangeMonitor::new();
        assert!(monitor.has_changed("image", "v1"));
        assert!(monitor.has_changed("image", "v2"));
        assert!(monitor.has_changed("image", "v1"));
    }

    #[test]
    fn test_keys_are_independent() {
        let monitor = ChangeMonitor::new();
        assert!(monitor.has_changed("a", "same"));
        assert!(monitor.has_changed("b", "same"));
        assert!(!monitor.has_changed("a", "same"));
    }
}
