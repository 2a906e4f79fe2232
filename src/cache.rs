//! Per-engine memoization cache.
//!
//! Each engine owns one cache per query type, created empty at engine
//! construction and living exactly as long as the engine instance. Keys are
//! the raw query strings as given by the caller (no normalization).
//!
//! A key has three logical states:
//! - missing entry: never looked up,
//! - `Some(None)`: looked up, confirmed absent (e.g. no PTR record),
//! - `Some(Some(v))`: looked up, confirmed present.
//!
//! A confirmed-absent entry must never trigger a repeat query within the
//! session, so "absent" is stored explicitly instead of being conflated with
//! "unknown". Failed lookups are never cached.

use std::collections::HashMap;

/// Memo cache mapping a query string to a confirmed result.
#[derive(Debug, Default)]
pub struct MemoCache<V> {
    entries: HashMap<String, Option<V>>,
}

impl<V> MemoCache<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the cached state for `key`: `None` if the key was never
    /// looked up, `Some(&None)` if confirmed absent, `Some(&Some(v))` if
    /// confirmed present.
    pub fn get(&self, key: &str) -> Option<&Option<V>> {
        self.entries.get(key)
    }

    /// Records a confirmed result for `key`. `None` means confirmed absent.
    pub fn insert(&mut self, key: &str, value: Option<V>) {
        self.entries.insert(key.to_string(), value);
    }

    /// Number of confirmed entries (present or absent).
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_absent_and_present_are_distinct() {
        let mut cache: MemoCache<String> = MemoCache::new();
        assert!(cache.get("a").is_none());

        cache.insert("a", None);
        assert_eq!(cache.get("a"), Some(&None));

        cache.insert("b", Some("value".to_string()));
        assert_eq!(cache.get("b"), Some(&Some("value".to_string())));
        assert!(cache.get("c").is_none());
    }

    #[test]
    fn keys_are_case_sensitive() {
        let mut cache: MemoCache<u32> = MemoCache::new();
        cache.insert("Example.COM", Some(1));
        assert!(cache.get("example.com").is_none());
        assert_eq!(cache.get("Example.COM"), Some(&Some(1)));
    }

    #[test]
    fn insert_overwrites() {
        let mut cache: MemoCache<u32> = MemoCache::new();
        cache.insert("k", None);
        cache.insert("k", Some(7));
        assert_eq!(cache.get("k"), Some(&Some(7)));
        assert_eq!(cache.len(), 1);
    }
}
