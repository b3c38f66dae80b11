//! Pluggable cache tier contract.
//!
//! The distributed and persistent tiers live outside this repository;
//! the manager only drives them through [`CacheTier`]. A disabled slot is
//! filled with [`NullTier`], so the manager's tier walk is identical
//! whether one or three tiers are active.

use async_trait::async_trait;
use caselens_core::ContextResult;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Identity of a cache tier, ordered fastest to slowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKind {
    /// In-process recency cache
    Memory,
    /// Shared cache across service instances
    Distributed,
    /// Durable cache surviving restarts
    Persistent,
}

impl TierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Memory => "memory",
            TierKind::Distributed => "distributed",
            TierKind::Persistent => "persistent",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pluggable slower cache tier.
///
/// Implementations store opaque JSON blobs under rendered cache keys and
/// honor the TTL passed to `set`. They should be thread-safe; the manager
/// shares one handle across concurrent requests.
///
/// Tier failures are never fatal: the manager logs them and treats a
/// failed read as a miss and a failed write or delete as a no-op.
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Which tier slot this implementation fills.
    fn kind(&self) -> TierKind;

    /// Whether this tier actually stores data. Inactive tiers are skipped
    /// by the manager and excluded from statistics.
    fn is_active(&self) -> bool {
        true
    }

    /// Get a value by key, or None on a miss.
    async fn get(&self, key: &str) -> ContextResult<Option<Value>>;

    /// Store a value under a key with the given TTL.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> ContextResult<()>;

    /// Delete a key. Returns true if something was removed.
    async fn delete(&self, key: &str) -> ContextResult<bool>;
}

/// Null-object tier for a disabled slot: never stores, never errs.
#[derive(Debug, Clone, Copy)]
pub struct NullTier {
    kind: TierKind,
}

impl NullTier {
    pub fn distributed() -> Self {
        Self {
            kind: TierKind::Distributed,
        }
    }

    pub fn persistent() -> Self {
        Self {
            kind: TierKind::Persistent,
        }
    }
}

#[async_trait]
impl CacheTier for NullTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    fn is_active(&self) -> bool {
        false
    }

    async fn get(&self, _key: &str) -> ContextResult<Option<Value>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> ContextResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> ContextResult<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_null_tier_is_inert() {
        let tier = NullTier::distributed();
        assert!(!tier.is_active());
        assert_eq!(tier.kind(), TierKind::Distributed);

        tier.set("k", json!(1), Duration::from_secs(60))
            .await
            .expect("set should not err");
        assert_eq!(tier.get("k").await.expect("get should not err"), None);
        assert!(!tier.delete("k").await.expect("delete should not err"));
    }

    #[test]
    fn test_tier_kind_display() {
        assert_eq!(TierKind::Memory.to_string(), "memory");
        assert_eq!(TierKind::Distributed.to_string(), "distributed");
        assert_eq!(TierKind::Persistent.to_string(), "persistent");
    }
}
