//! LRU-bounded cache, pluggable alternative to `PerpetualCache`

use crate::cache::Cache;
use crate::types::RowSet;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Cache with a fixed capacity and least-recently-used eviction.
///
/// Same contract as every `Cache`: shared per namespace, atomic `clear`.
pub struct BoundedCache {
    id: String,
    entries: Mutex<LruCache<String, Arc<RowSet>>>,
}

impl BoundedCache {
    pub fn new(id: impl Into<String>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            id: id.into(),
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl Cache for BoundedCache {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, key: &str) -> Option<Arc<RowSet>> {
        self.entries.lock().get(key).cloned()
    }

    fn put(&self, key: String, value: Arc<RowSet>) {
        self.entries.lock().put(key, value);
    }

    fn remove(&self, key: &str) -> Option<Arc<RowSet>> {
        self.entries.lock().pop(key)
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SqlRow, Value};

    fn rows(n: i64) -> Arc<RowSet> {
        let mut row = SqlRow::new();
        row.insert("id".to_string(), Value::Integer(n));
        Arc::new(vec![row])
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = BoundedCache::new("UserMapper", 2);
        cache.put("a".to_string(), rows(1));
        cache.put("b".to_string(), rows(2));
        cache.put("c".to_string(), rows(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = BoundedCache::new("UserMapper", 8);
        cache.put("a".to_string(), rows(1));
        cache.clear();
        assert!(cache.is_empty());
    }
}
