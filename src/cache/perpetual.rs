//! Default cache: an unbounded in-memory map
//!
//! No eviction policy, no TTL, no size bound: a known limitation of the
//! default implementation, not a bug. Plug in `BoundedCache` (or a custom
//! `Cache`) where memory pressure matters.

use crate::cache::Cache;
use crate::types::RowSet;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Hit/miss counters
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct PerpetualState {
    entries: AHashMap<String, Arc<RowSet>>,
    stats: CacheStats,
}

/// Unbounded map cache; the single write lock makes `clear` atomic with
/// respect to concurrent `get`/`put`.
pub struct PerpetualCache {
    id: String,
    state: RwLock<PerpetualState>,
}

impl PerpetualCache {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: RwLock::new(PerpetualState {
                entries: AHashMap::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.state.read().stats.clone()
    }
}

impl Cache for PerpetualCache {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, key: &str) -> Option<Arc<RowSet>> {
        let mut state = self.state.write();
        match state.entries.get(key).cloned() {
            Some(value) => {
                state.stats.hits += 1;
                Some(value)
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    fn put(&self, key: String, value: Arc<RowSet>) {
        self.state.write().entries.insert(key, value);
    }

    fn remove(&self, key: &str) -> Option<Arc<RowSet>> {
        self.state.write().entries.remove(key)
    }

    fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
    }

    fn len(&self) -> usize {
        self.state.read().entries.len()
    }
}
