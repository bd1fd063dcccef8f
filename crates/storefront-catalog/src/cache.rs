use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Get-or-compute cache with a fixed per-entry TTL and explicit
/// invalidation. Read-mostly and safe to share across threads behind an
/// `Arc`; entries are recomputed at most once per expiry.
///
/// Collaborator for expensive lookups the projector's thunks perform
/// (taxonomy aggregation); the TTL is operator-configured, day-scoped by
/// default.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, computing and storing it when
    /// absent or expired.
    ///
    /// `compute` runs under the cache lock, which serializes concurrent
    /// misses for the same key into a single computation.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        if let Some(entry) = entries.get(&key) {
            if entry.expires_at > now {
                return entry.value.clone();
            }
        }

        let value = compute();
        entries.insert(
            key,
            Entry {
                value: value.clone(),
                expires_at: now + self.ttl,
            },
        );
        value
    }

    /// Drops `key`'s entry so the next read recomputes. Call on writes to
    /// the underlying data.
    pub fn invalidate(&self, key: &K) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish()
    }
}
