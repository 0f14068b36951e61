//! Bounded memo of parse results keyed by document text.
//!
//! Eviction is FIFO: once the cache is full, inserting a new text drops the
//! entry that was inserted first. Looking an entry up does not refresh its
//! age, so a burst of requests over one snapshot cannot pin stale texts.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::parser::{Parse, parse};

/// Default number of distinct texts kept.
pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug)]
pub struct ParseCache {
    capacity: usize,
    map: FxHashMap<Arc<str>, Parse>,
    order: VecDeque<Arc<str>>,
    stats: CacheStats,
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            map: FxHashMap::default(),
            order: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    /// Return the cached parse of `text`, parsing and inserting on a miss.
    pub fn get_or_parse(&mut self, text: &str) -> Parse {
        if let Some(hit) = self.map.get(text) {
            self.stats.hits = self.stats.hits.saturating_add(1);
            tracing::trace!(len = text.len(), "parse cache hit");
            return hit.clone();
        }
        self.stats.misses = self.stats.misses.saturating_add(1);
        tracing::trace!(len = text.len(), "parse cache miss");
        let result = parse(text);
        self.insert(text, result.clone());
        result
    }

    pub fn get(&self, text: &str) -> Option<&Parse> {
        self.map.get(text)
    }

    pub fn insert(&mut self, text: &str, result: Parse) {
        if let Some(existing) = self.map.get_mut(text) {
            *existing = result;
            return;
        }
        while self.map.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.map.remove(&oldest).is_some() {
                self.stats.evictions = self.stats.evictions.saturating_add(1);
            }
        }
        let key: Arc<str> = Arc::from(text);
        self.order.push_back(key.clone());
        self.map.insert(key, result);
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Cached texts in eviction order.
    pub fn keys_oldest_first(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|k| &**k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_when_full() {
        let mut cache = ParseCache::new(2);
        cache.get_or_parse("var a = 1");
        cache.get_or_parse("var b = 2");
        cache.get_or_parse("var c = 3");
        let keys: Vec<_> = cache.keys_oldest_first().collect();
        assert_eq!(keys, vec!["var b = 2", "var c = 3"]);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_hit_does_not_refresh_age() {
        let mut cache = ParseCache::new(2);
        cache.get_or_parse("a");
        cache.get_or_parse("b");
        cache.get_or_parse("a");
        cache.get_or_parse("c");
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_zero_capacity_still_holds_one() {
        let mut cache = ParseCache::new(0);
        cache.get_or_parse("x");
        assert_eq!(cache.len(), 1);
    }
}
