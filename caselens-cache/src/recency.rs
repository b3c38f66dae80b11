//! Bounded in-process recency cache (the fast tier).
//!
//! A fixed-capacity key/value store with least-recently-used eviction and
//! lazy per-entry expiration. Values are opaque JSON blobs; the cache
//! never inspects them.
//!
//! The structure itself is single-owner (`&mut self` API). The tiered
//! manager guards it with a mutex, which is required on a parallel
//! runtime because concurrent requests touch the same tier.

use caselens_core::{CaseStatus, Timestamp};
use chrono::Utc;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::debug;

/// A cached value with its expiry and access bookkeeping.
///
/// Recency bookkeeping (`hit_count`, `last_accessed`) is mutated only by
/// the owning cache on a successful read.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: Value,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub hit_count: u64,
    pub last_accessed: Option<Timestamp>,
    /// Case status at write time. Metadata only; the entry's own validity
    /// comes from `expires_at`.
    pub case_status: CaseStatus,
}

impl CacheEntry {
    fn new(value: Value, ttl: Duration, case_status: CaseStatus) -> Self {
        let now = Utc::now();
        // An out-of-range TTL saturates to "never expires".
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);
        Self {
            value,
            created_at: now,
            expires_at,
            hit_count: 0,
            last_accessed: None,
            case_status,
        }
    }

    /// Whether this entry's TTL has elapsed.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    fn record_hit(&mut self) {
        self.hit_count += 1;
        self.last_accessed = Some(Utc::now());
    }
}

/// Statistics snapshot for the recency cache.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecencyCacheStats {
    pub size: usize,
    pub capacity: usize,
    /// size / capacity, 0.0 for a zero-capacity cache
    pub utilization: f64,
    /// Cumulative hit count across current entries
    pub total_hits: u64,
    /// Entries currently expired but not yet lazily purged
    pub expired_entries: usize,
    pub default_ttl: Duration,
}

/// Fixed-capacity LRU cache with per-entry TTL.
///
/// Recency is a total order over keys (front = least recently used),
/// updated on both read and write. Capacity is enforced after every
/// insert by evicting the single least-recently-used entry; expiration
/// is checked lazily at access time only.
#[derive(Debug)]
pub struct RecencyCache {
    capacity: usize,
    default_ttl: Duration,
    entries: HashMap<String, CacheEntry>,
    /// Recency order, least recently used at the front.
    order: VecDeque<String>,
}

impl RecencyCache {
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            capacity,
            default_ttl,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a value by key.
    ///
    /// An expired entry is removed as a side effect and reported absent.
    /// A valid hit marks the key most-recently-used and increments its
    /// hit counter.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => entry.is_expired(),
        };

        if expired {
            debug!(key, "cache entry expired");
            self.remove(key);
            return None;
        }

        self.touch(key);
        let entry = self.entries.get_mut(key)?;
        entry.record_hit();
        debug!(key, hits = entry.hit_count, "cache hit");
        Some(entry.value.clone())
    }

    /// Insert or overwrite a value, marking the key most-recently-used.
    ///
    /// If the insert pushes the cache over capacity, the least-recently-used
    /// entry is evicted. At most one entry is added per call, so at most
    /// one eviction is needed.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: Value,
        ttl: Option<Duration>,
        case_status: CaseStatus,
    ) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);

        self.entries
            .insert(key.clone(), CacheEntry::new(value, ttl, case_status));
        self.touch(&key);

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!(key = %oldest, "evicting least recently used entry");
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }

        debug!(
            key = %key,
            ttl_secs = ttl.as_secs(),
            status = %case_status,
            size = self.entries.len(),
            "cache set"
        );
    }

    /// Remove an entry. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
            debug!(key, "cache delete");
            true
        } else {
            false
        }
    }

    /// Remove every entry. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.order.clear();
        count
    }

    pub fn stats(&self) -> RecencyCacheStats {
        let total_hits = self.entries.values().map(|e| e.hit_count).sum();
        let expired_entries = self.entries.values().filter(|e| e.is_expired()).count();
        let utilization = if self.capacity > 0 {
            self.entries.len() as f64 / self.capacity as f64
        } else {
            0.0
        };

        RecencyCacheStats {
            size: self.entries.len(),
            capacity: self.capacity,
            utilization,
            total_hits,
            expired_entries,
            default_ttl: self.default_ttl,
        }
    }

    /// Move a key to the most-recently-used position.
    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_back(key.to_string());
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// The cache never exceeds its capacity, whatever the insert order.
        #[test]
        fn prop_size_bounded_by_capacity(
            capacity in 1usize..16,
            keys in proptest::collection::vec("[a-f0-9]{1,8}", 0..64),
        ) {
            let mut cache = RecencyCache::new(capacity, Duration::from_secs(60));
            for key in keys {
                cache.insert(key, json!(1), None, CaseStatus::Active);
                prop_assert!(cache.len() <= capacity);
            }
        }

        /// After inserting capacity + 1 distinct keys with no reads, exactly
        /// the first-inserted key is gone.
        #[test]
        fn prop_overflow_evicts_exactly_first(capacity in 1usize..12) {
            let mut cache = RecencyCache::new(capacity, Duration::from_secs(60));
            let keys: Vec<String> = (0..=capacity).map(|i| format!("key-{i}")).collect();
            for key in &keys {
                cache.insert(key.clone(), json!(1), None, CaseStatus::Active);
            }

            prop_assert!(cache.get(&keys[0]).is_none());
            for key in &keys[1..] {
                prop_assert!(cache.get(key).is_some());
            }
        }
    }
}
