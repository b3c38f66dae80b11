//! Cache layer for context queries: a bounded in-process recency cache
//! fronting up to two pluggable slower tiers.
//!
//! # Tier model
//!
//! Tier 1 is a mandatory in-process LRU ([`RecencyCache`]) with a short
//! fixed TTL. Tiers 2 and 3 (a shared distributed cache and a persistent
//! store) are optional and plugged in through the [`CacheTier`] trait;
//! when absent they are represented by [`NullTier`] so the manager's
//! control flow never special-cases a missing tier.
//!
//! # TTL policy
//!
//! The fast tier always uses its own short TTL. The slower tiers select
//! their TTL from case status: active cases churn and get a short TTL,
//! closed cases are stable and get a long one.
//!
//! # Tenant isolation
//!
//! Every key is derived through [`CacheKey`], which cannot be built
//! without a tenant id and a case id, so cross-tenant cache access is
//! structurally impossible.

pub mod key;
pub mod manager;
pub mod recency;
pub mod tier;

pub use key::CacheKey;
pub use manager::{CacheConfig, CacheManagerStats, TierStatsSnapshot, TieredCacheManager};
pub use recency::{CacheEntry, RecencyCache, RecencyCacheStats};
pub use tier::{CacheTier, NullTier, TierKind};
