//! Multi-tier cache manager for context queries.
//!
//! Orchestrates up to three tiers, checked fastest first:
//!
//! 1. In-process recency cache (short fixed TTL)
//! 2. Distributed cache (status-selected TTL), optional
//! 3. Persistent cache (status-selected TTL), optional
//!
//! A hit in a slower tier is promoted into every faster tier. Writes and
//! deletes fan out to all active tiers independently; a failing tier is
//! logged and skipped, never fatal. All keys are derived through
//! [`CacheKey`] so the tiers agree on addressing.

use crate::key::CacheKey;
use crate::recency::{RecencyCache, RecencyCacheStats};
use crate::tier::{CacheTier, NullTier};
use caselens_core::{CaseStatus, ContextScope, Dimension};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the tiered cache manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries in the fast tier.
    pub capacity: usize,
    /// Fixed TTL for the fast tier, independent of case status.
    pub memory_ttl: Duration,
    /// Slower-tier TTL for active cases (data still churns).
    pub active_ttl: Duration,
    /// Slower-tier TTL for closed cases (stable, rarely revisited).
    pub closed_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            memory_ttl: Duration::from_secs(600),      // 10 minutes
            active_ttl: Duration::from_secs(3600),     // 1 hour
            closed_ttl: Duration::from_secs(86_400),   // 24 hours
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fast-tier capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the fast-tier TTL.
    pub fn with_memory_ttl(mut self, ttl: Duration) -> Self {
        self.memory_ttl = ttl;
        self
    }

    /// Set the slower-tier TTL for active cases.
    pub fn with_active_ttl(mut self, ttl: Duration) -> Self {
        self.active_ttl = ttl;
        self
    }

    /// Set the slower-tier TTL for closed cases.
    pub fn with_closed_ttl(mut self, ttl: Duration) -> Self {
        self.closed_ttl = ttl;
        self
    }
}

// ============================================================================
// STATISTICS
// ============================================================================

#[derive(Debug, Default)]
struct TierCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TierCounters {
    fn snapshot(&self) -> TierStatsSnapshot {
        TierStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

/// Hit/miss counts for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TierStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
}

impl TierStatsSnapshot {
    /// Hit rate in [0.0, 1.0]; 0.0 when the tier has seen no operations.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Statistics across all tiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheManagerStats {
    pub memory: TierStatsSnapshot,
    pub distributed: TierStatsSnapshot,
    pub persistent: TierStatsSnapshot,
    pub total_sets: u64,
    pub total_deletes: u64,
    /// Snapshot of the fast tier's internal state.
    pub memory_cache: RecencyCacheStats,
}

impl CacheManagerStats {
    /// Total hits across all tiers divided by total get operations across
    /// all tiers, 0.0 when nothing has been looked up yet.
    pub fn overall_hit_rate(&self) -> f64 {
        let hits = self.memory.hits + self.distributed.hits + self.persistent.hits;
        let total = hits + self.memory.misses + self.distributed.misses + self.persistent.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

// ============================================================================
// TIERED CACHE MANAGER
// ============================================================================

/// Multi-tier cache manager.
///
/// Construct once at process start and share by reference across request
/// handlers; all methods take `&self`. The fast tier sits behind a mutex
/// because concurrent requests mutate its recency order.
///
/// # Example
///
/// ```ignore
/// let manager = TieredCacheManager::new(CacheConfig::default())
///     .with_distributed(redis_tier);
///
/// manager.set("client-1", "case-9", ContextScope::Standard, value,
///             CaseStatus::Active, None).await;
/// let cached = manager.get("client-1", "case-9", ContextScope::Standard, None).await;
/// ```
pub struct TieredCacheManager {
    config: CacheConfig,
    memory: Mutex<RecencyCache>,
    distributed: Arc<dyn CacheTier>,
    persistent: Arc<dyn CacheTier>,
    memory_stats: TierCounters,
    distributed_stats: TierCounters,
    persistent_stats: TierCounters,
    total_sets: AtomicU64,
    total_deletes: AtomicU64,
}

impl TieredCacheManager {
    /// Create a manager with only the fast tier active.
    pub fn new(config: CacheConfig) -> Self {
        let memory = RecencyCache::new(config.capacity, config.memory_ttl);
        info!(
            capacity = config.capacity,
            memory_ttl_secs = config.memory_ttl.as_secs(),
            "cache manager initialized (fast tier only)"
        );
        Self {
            config,
            memory: Mutex::new(memory),
            distributed: Arc::new(NullTier::distributed()),
            persistent: Arc::new(NullTier::persistent()),
            memory_stats: TierCounters::default(),
            distributed_stats: TierCounters::default(),
            persistent_stats: TierCounters::default(),
            total_sets: AtomicU64::new(0),
            total_deletes: AtomicU64::new(0),
        }
    }

    /// Plug in a distributed (tier 2) cache.
    pub fn with_distributed(mut self, tier: Arc<dyn CacheTier>) -> Self {
        info!(tier = %tier.kind(), active = tier.is_active(), "distributed tier attached");
        self.distributed = tier;
        self
    }

    /// Plug in a persistent (tier 3) cache.
    pub fn with_persistent(mut self, tier: Arc<dyn CacheTier>) -> Self {
        info!(tier = %tier.kind(), active = tier.is_active(), "persistent tier attached");
        self.persistent = tier;
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get a cached context, checking tiers fastest first.
    ///
    /// A hit in a slower tier is written back into every faster tier
    /// before being returned. Tier failures are logged and treated as
    /// misses; a miss in every active tier is a miss.
    pub async fn get(
        &self,
        tenant_id: &str,
        case_id: &str,
        scope: ContextScope,
        dimension: Option<Dimension>,
    ) -> Option<Value> {
        let key = self.render_key(tenant_id, case_id, scope, dimension);

        // Tier 1: in-process recency cache.
        match self.memory.lock() {
            Ok(mut memory) => {
                if let Some(value) = memory.get(&key) {
                    self.memory_stats.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "memory cache hit");
                    return Some(value);
                }
                self.memory_stats.misses.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                warn!(key = %key, "memory cache lock poisoned; treating as miss");
                self.memory_stats.misses.fetch_add(1, Ordering::Relaxed);
            }
        }

        // Tier 2: distributed cache.
        if self.distributed.is_active() {
            match self.distributed.get(&key).await {
                Ok(Some(value)) => {
                    self.distributed_stats.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "distributed cache hit");
                    self.promote_to_memory(&key, value.clone());
                    return Some(value);
                }
                Ok(None) => {
                    self.distributed_stats.misses.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "distributed cache read failed");
                    self.distributed_stats.misses.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        // Tier 3: persistent cache.
        if self.persistent.is_active() {
            match self.persistent.get(&key).await {
                Ok(Some(value)) => {
                    self.persistent_stats.hits.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %key, "persistent cache hit");
                    if self.distributed.is_active() {
                        if let Err(err) = self
                            .distributed
                            .set(&key, value.clone(), self.config.active_ttl)
                            .await
                        {
                            warn!(key = %key, error = %err, "distributed promotion failed");
                        }
                    }
                    self.promote_to_memory(&key, value.clone());
                    return Some(value);
                }
                Ok(None) => {
                    self.persistent_stats.misses.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "persistent cache read failed");
                    self.persistent_stats.misses.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        debug!(key = %key, "cache miss (all tiers)");
        None
    }

    /// Store a context in every active tier.
    ///
    /// The fast tier always uses its fixed short TTL; the slower tiers use
    /// the TTL selected by case status. Per-tier write failures are logged
    /// and never block the other tiers.
    pub async fn set(
        &self,
        tenant_id: &str,
        case_id: &str,
        scope: ContextScope,
        value: Value,
        case_status: CaseStatus,
        dimension: Option<Dimension>,
    ) {
        let key = self.render_key(tenant_id, case_id, scope, dimension);
        let slow_ttl = self.status_ttl(case_status);

        match self.memory.lock() {
            Ok(mut memory) => {
                memory.insert(
                    key.as_str(),
                    value.clone(),
                    Some(self.config.memory_ttl),
                    case_status,
                );
            }
            Err(_) => warn!(key = %key, "memory cache lock poisoned; skipping write"),
        }

        if self.distributed.is_active() {
            if let Err(err) = self.distributed.set(&key, value.clone(), slow_ttl).await {
                warn!(key = %key, error = %err, "distributed cache write failed");
            }
        }

        if self.persistent.is_active() {
            if let Err(err) = self.persistent.set(&key, value, slow_ttl).await {
                warn!(key = %key, error = %err, "persistent cache write failed");
            }
        }

        self.total_sets.fetch_add(1, Ordering::Relaxed);
        debug!(
            key = %key,
            status = %case_status,
            slow_ttl_secs = slow_ttl.as_secs(),
            "cache set"
        );
    }

    /// Delete cached contexts across all tiers.
    ///
    /// With a scope, removes that single key. Without one, removes the key
    /// for every known scope value, which is how a whole case is
    /// invalidated. Returns the number of entries actually removed.
    pub async fn delete(
        &self,
        tenant_id: &str,
        case_id: &str,
        scope: Option<ContextScope>,
        dimension: Option<Dimension>,
    ) -> usize {
        let scopes: &[ContextScope] = match scope {
            Some(ref s) => std::slice::from_ref(s),
            None => &ContextScope::ALL,
        };

        let mut deleted = 0;
        for scope in scopes {
            let key = self.render_key(tenant_id, case_id, *scope, dimension);
            deleted += self.delete_key(&key).await;
        }

        self.total_deletes.fetch_add(deleted as u64, Ordering::Relaxed);
        info!(
            case_id,
            scope = scope.map(|s| s.as_str()).unwrap_or("all"),
            deleted,
            "cache delete"
        );
        deleted
    }

    /// Invalidate every cached context for a case, across scopes and tiers.
    pub async fn invalidate_case(&self, tenant_id: &str, case_id: &str) -> usize {
        info!(case_id, "invalidating all cached contexts for case");
        self.delete(tenant_id, case_id, None, None).await
    }

    /// Statistics snapshot across all tiers.
    pub fn stats(&self) -> CacheManagerStats {
        let memory_cache = self
            .memory
            .lock()
            .map(|memory| memory.stats())
            .unwrap_or_default();

        CacheManagerStats {
            memory: self.memory_stats.snapshot(),
            distributed: self.distributed_stats.snapshot(),
            persistent: self.persistent_stats.snapshot(),
            total_sets: self.total_sets.load(Ordering::Relaxed),
            total_deletes: self.total_deletes.load(Ordering::Relaxed),
            memory_cache,
        }
    }

    /// Zero all counters without touching cached data.
    pub fn reset_stats(&self) {
        self.memory_stats.reset();
        self.distributed_stats.reset();
        self.persistent_stats.reset();
        self.total_sets.store(0, Ordering::Relaxed);
        self.total_deletes.store(0, Ordering::Relaxed);
        info!("cache statistics reset");
    }

    fn render_key(
        &self,
        tenant_id: &str,
        case_id: &str,
        scope: ContextScope,
        dimension: Option<Dimension>,
    ) -> String {
        match dimension {
            Some(d) => CacheKey::for_dimension(tenant_id, case_id, scope, d).render(),
            None => CacheKey::for_scope(tenant_id, case_id, scope).render(),
        }
    }

    /// Slower-tier TTL selected by case status.
    fn status_ttl(&self, case_status: CaseStatus) -> Duration {
        match case_status {
            CaseStatus::Active => self.config.active_ttl,
            CaseStatus::Closed => self.config.closed_ttl,
        }
    }

    /// Write a slower-tier hit back into the fast tier.
    fn promote_to_memory(&self, key: &str, value: Value) {
        match self.memory.lock() {
            Ok(mut memory) => {
                memory.insert(key, value, Some(self.config.memory_ttl), CaseStatus::default());
            }
            Err(_) => warn!(key, "memory cache lock poisoned; skipping promotion"),
        }
    }

    async fn delete_key(&self, key: &str) -> usize {
        let mut deleted = 0;

        match self.memory.lock() {
            Ok(mut memory) => {
                if memory.remove(key) {
                    deleted += 1;
                }
            }
            Err(_) => warn!(key, "memory cache lock poisoned; skipping delete"),
        }

        for tier in [&self.distributed, &self.persistent] {
            if !tier.is_active() {
                continue;
            }
            match tier.delete(key).await {
                Ok(true) => deleted += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(key, tier = %tier.kind(), error = %err, "cache tier delete failed");
                }
            }
        }

        deleted
    }
}

// ============================================================================
// TESTS
// ============================================================================
