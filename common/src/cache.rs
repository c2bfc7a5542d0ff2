//! Bounded key/value cache with first-in first-out eviction

use std::{
    collections::{HashMap, VecDeque},
    hash::Hash,
};
use tracing::debug;

/// Hit/miss/eviction counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Cache holding at most `capacity` entries. Lookups go through the map; the
/// insertion order lives in a separate queue so that eviction of the oldest
/// entry is O(1).
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    stats: CacheStats,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity.saturating_add(1)),
            order: VecDeque::with_capacity(capacity.saturating_add(1)),
            stats: CacheStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Cached value for `key`, counted as a hit or a miss
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Inserts `key`, evicting the oldest entry once over capacity. Re-inserting
    /// a present key replaces its value without changing its position.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            return;
        }
        self.entries.insert(key.clone(), value);
        self.order.push_back(key);

        while self.order.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.stats.evictions += 1;
            debug!(capacity = self.capacity, "evicted oldest cache entry");
        }
    }

    /// Returns the cached value for `key`, computing and inserting it on a miss.
    /// The whole check-then-insert-then-evict sequence runs under the caller's
    /// borrow, so wrapping the cache in a mutex makes it safe to share.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: &K,
        load: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = load()?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_first_inserted_when_over_capacity() {
        let mut cache = BoundedCache::new(3);
        for i in 0..4u32 {
            cache.insert(i, i * 10);
        }
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains(&0));
        for i in 1..4u32 {
            assert_eq!(cache.get(&i), Some(i * 10));
        }
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut cache = BoundedCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 3);
        cache.insert("c", 4);
        // "a" is still the oldest entry
        assert!(!cache.contains(&"a"));
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(4));
    }

    #[test]
    fn get_or_try_insert_with_loads_once() {
        let mut cache: BoundedCache<&str, u32> = BoundedCache::new(2);
        let mut loads = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with(&"k", || -> Result<u32, ()> {
                    loads += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(loads, 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 2,
                misses: 1,
                evictions: 0
            }
        );
    }

    #[test]
    fn failed_load_inserts_nothing() {
        let mut cache: BoundedCache<u8, u8> = BoundedCache::new(2);
        let result = cache.get_or_try_insert_with(&1, || Err("bad bytes"));
        assert_eq!(result, Err("bad bytes"));
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_never_retains() {
        let mut cache = BoundedCache::new(0);
        cache.insert(1, 1);
        assert!(cache.is_empty());
    }
}
