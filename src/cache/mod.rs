//! In-memory record cache.
//!
//! Bounded LRU map from analyzed URL to its `StoreRecord`. Insertion past
//! capacity evicts the least-recently-used entry, so a long-running process
//! holds a working set instead of growing without limit. Reads refresh
//! recency; a second insert for the same URL overwrites the record
//! (last-write-wins).

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::models::StoreRecord;

/// Thread-safe bounded LRU cache of analyzed stores.
pub struct RecordCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

struct CacheInner {
    records: HashMap<String, StoreRecord>,
    /// Recency order, least recent at the front
    order: VecDeque<String>,
}

impl RecordCache {
    /// Creates a cache holding at most `capacity` records. A capacity of 0 is
    /// clamped to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                records: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    /// Inserts or overwrites the record for a URL, evicting the
    /// least-recently-used entry when at capacity.
    pub fn insert(&self, record: StoreRecord) {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let url = record.url.clone();
        if inner.records.contains_key(&url) {
            inner.order.retain(|u| u != &url);
        } else if inner.records.len() >= self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.records.remove(&evicted);
                log::debug!("Cache at capacity, evicted {}", evicted);
            }
        }
        inner.order.push_back(url.clone());
        inner.records.insert(url, record);
    }

    /// Looks up a URL, refreshing its recency on a hit.
    pub fn get(&self, url: &str) -> Option<StoreRecord> {
        let mut inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(record) = inner.records.get(url).cloned() {
            inner.order.retain(|u| u != url);
            inner.order.push_back(url.to_string());
            Some(record)
        } else {
            None
        }
    }

    /// Returns all cached records whose URL or gateway names contain the
    /// keyword (case-insensitive). Does not refresh recency.
    pub fn search(&self, keyword: &str) -> Vec<StoreRecord> {
        let inner = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let needle = keyword.to_lowercase();
        inner
            .records
            .values()
            .filter(|r| {
                r.url.to_lowercase().contains(&needle)
                    || r.gateways.iter().any(|g| g.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(guard) => guard.records.len(),
            Err(poisoned) => poisoned.into_inner().records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn record(url: &str) -> StoreRecord {
        StoreRecord::new(
            url.to_string(),
            true,
            BTreeSet::new(),
            false,
            false,
            false,
            false,
            vec![],
            0.0,
            0.0,
            0.0,
        )
    }

    #[test]
    fn test_insert_and_get() {
        let cache = RecordCache::new(4);
        cache.insert(record("https://a.example"));
        assert!(cache.get("https://a.example").is_some());
        assert!(cache.get("https://b.example").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let cache = RecordCache::new(2);
        cache.insert(record("https://a.example"));
        cache.insert(record("https://b.example"));
        cache.insert(record("https://c.example"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("https://a.example").is_none());
        assert!(cache.get("https://b.example").is_some());
        assert!(cache.get("https://c.example").is_some());
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = RecordCache::new(2);
        cache.insert(record("https://a.example"));
        cache.insert(record("https://b.example"));
        // Touch a, making b the LRU entry
        assert!(cache.get("https://a.example").is_some());
        cache.insert(record("https://c.example"));

        assert!(cache.get("https://a.example").is_some());
        assert!(cache.get("https://b.example").is_none());
    }

    #[test]
    fn test_reinsert_overwrites_without_eviction() {
        let cache = RecordCache::new(2);
        cache.insert(record("https://a.example"));
        cache.insert(record("https://b.example"));

        let mut updated = record("https://a.example");
        updated.is_real_store = false;
        cache.insert(updated);

        assert_eq!(cache.len(), 2);
        let got = cache.get("https://a.example").unwrap();
        assert!(!got.is_real_store);
        assert!(cache.get("https://b.example").is_some());
    }

    #[test]
    fn test_keyword_search() {
        let cache = RecordCache::new(4);
        cache.insert(record("https://shoes.example"));
        cache.insert(record("https://books.example"));

        let hits = cache.search("SHOES");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://shoes.example");
        assert!(cache.search("hats").is_empty());
    }

    #[test]
    fn test_keyword_search_matches_gateways() {
        let cache = RecordCache::new(4);
        let mut r = record("https://shop.example");
        r.gateways.insert("Stripe".to_string());
        cache.insert(r);

        let hits = cache.search("stripe");
        assert_eq!(hits.len(), 1);
        assert!(cache.search("paypal").is_empty());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let cache = RecordCache::new(0);
        cache.insert(record("https://a.example"));
        assert_eq!(cache.len(), 1);
        cache.insert(record("https://b.example"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("https://b.example").is_some());
    }
}
