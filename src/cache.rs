//! Process-local TTL cache
//!
//! Entries carry their insertion instant and are treated as absent once
//! `now - inserted >= ttl`. Owned by the component that needs it (status
//! resolver, collaborator lookup) rather than living in a global.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// PR status entries live for five minutes
pub const STATUS_TTL: Duration = Duration::from_secs(5 * 60);

/// Collaborator lists live for fifteen minutes
pub const COLLABORATORS_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A string-keyed cache with a fixed time-to-live
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: HashMap<String, Entry<V>>,
}

impl<V: Clone> TtlCache<V> {
    /// Create an empty cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Configured TTL
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live entry
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Get an entry as seen at `now`
    pub fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let entry = self.entries.get(key)?;
        if now.saturating_duration_since(entry.inserted_at) < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Insert or overwrite an entry, timestamped now
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Insert or overwrite an entry with an explicit timestamp
    pub fn insert_at(&mut self, key: impl Into<String>, value: V, inserted_at: Instant) {
        self.entries.insert(key.into(), Entry { value, inserted_at });
    }

    /// Drop an entry; returns whether one was present
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Number of stored entries, live or expired
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_visible_within_ttl() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("owner/repo/1", 7u32, t0);

        assert_eq!(cache.get_at("owner/repo/1", t0 + Duration::from_secs(59)), Some(7));
    }

    #[test]
    fn test_entry_expires_at_ttl() {
        let mut cache = TtlCache::new(Duration::from_secs(60));
        let t0 = Instant::now();
        cache.insert_at("k", "v".to_string(), t0);

        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(60)), None);
        // Expired entries stay stored until overwritten
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_refreshes_timestamp() {
        let mut cache = TtlCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.insert_at("k", 1, t0);
        cache.insert_at("k", 2, t0 + Duration::from_secs(8));

        assert_eq!(cache.get_at("k", t0 + Duration::from_secs(15)), Some(2));
    }

    #[test]
    fn test_invalidate() {
        let mut cache = TtlCache::new(STATUS_TTL);
        cache.insert("k", 1);
        assert!(cache.invalidate("k"));
        assert!(!cache.invalidate("k"));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ttl_constants() {
        assert_eq!(STATUS_TTL, Duration::from_secs(300));
        assert_eq!(COLLABORATORS_TTL, Duration::from_secs(900));
    }
}
