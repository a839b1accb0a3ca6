//! Second-level cache abstraction
//!
//! A cache is identified by the namespace that owns it and shared by every
//! statement in that namespace. Invalidation is namespace-wide and coarse:
//! any write clears the whole cache, because any write may invalidate any
//! cached read. False invalidation is acceptable; stale reads are not.

mod bounded;
mod perpetual;

pub use bounded::BoundedCache;
pub use perpetual::{CacheStats, PerpetualCache};

use crate::types::RowSet;
use std::sync::Arc;

/// Key -> stored result set, guarded for concurrent access.
///
/// Values are shared (`Arc`) so a hit returns the identical stored rows
/// without copying. `clear` must be atomic with respect to concurrent
/// `get`/`put`; a caller must never observe a half-cleared cache.
pub trait Cache: Send + Sync {
    /// The owning namespace.
    fn id(&self) -> &str;

    fn get(&self, key: &str) -> Option<Arc<RowSet>>;

    fn put(&self, key: String, value: Arc<RowSet>);

    fn remove(&self, key: &str) -> Option<Arc<RowSet>>;

    /// Drops every entry.
    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
