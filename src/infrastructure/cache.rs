use lru::LruCache;
use std::num::NonZeroUsize;

/// Bounded LRU cache. A capacity of zero gives a cache that never stores anything.
pub struct Cache<K, V> {
    inner: Option<LruCache<K, V>>,
}

impl<K: std::hash::Hash + Eq, V> Cache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Cache {
            inner: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.inner.as_mut().and_then(|inner| inner.get(key))
    }

    pub fn insert(&mut self, key: K, value: V) {
        if let Some(inner) = self.inner.as_mut() {
            inner.put(key, value);
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.as_mut().and_then(|inner| inner.pop(key))
    }

    pub fn len(&self) -> usize {
        self.inner.as_ref().map_or(0, |inner| inner.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = Cache::new(2);
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.get(&1);
        cache.insert(3, "c");

        assert_eq!(cache.get(&1), Some(&"a"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = Cache::new(0);
        cache.insert(1, "a");
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut cache = Cache::new(4);
        cache.insert(1, "a");
        cache.insert(2, "b");
        assert_eq!(cache.remove(&1), Some("a"));
        assert_eq!(cache.remove(&1), None);
        assert_eq!(cache.len(), 1);
    }
}
