//! Case-scoped cache key generation.
//!
//! Keys cannot be constructed without a tenant id and a case id, so every
//! cache operation is tenant-isolated by construction. The rendered form
//! keeps the identifying fields readable for observability and appends a
//! SHA-256 digest so that any field difference (including the optional
//! dimension) yields a distinct key.

use caselens_core::{ContextScope, Dimension};
use sha2::{Digest, Sha256};
use std::fmt;

/// Namespace prefix for all context cache keys.
const NAMESPACE: &str = "ctx";

/// Separator between key fields in the digest input.
const SEPARATOR: char = ':';

/// Number of digest hex chars appended to the rendered key.
const DIGEST_LEN: usize = 16;

/// A cache key scoped to (tenant, case, scope) with an optional dimension.
///
/// # Rendered format
///
/// `ctx:{tenant}:{case}:{scope}:{digest}` where `digest` is the first 16
/// hex chars of SHA-256 over the separator-joined fields. Identical inputs
/// always render identically; inputs differing in any field never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    tenant_id: String,
    case_id: String,
    scope: ContextScope,
    dimension: Option<Dimension>,
}

impl CacheKey {
    /// Key for a whole-scope composite context.
    pub fn for_scope(tenant_id: &str, case_id: &str, scope: ContextScope) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            case_id: case_id.to_string(),
            scope,
            dimension: None,
        }
    }

    /// Key for a single cached dimension.
    pub fn for_dimension(
        tenant_id: &str,
        case_id: &str,
        scope: ContextScope,
        dimension: Dimension,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            case_id: case_id.to_string(),
            scope,
            dimension: Some(dimension),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn scope(&self) -> ContextScope {
        self.scope
    }

    pub fn dimension(&self) -> Option<Dimension> {
        self.dimension
    }

    /// Render the key to its storage form.
    pub fn render(&self) -> String {
        let mut input = format!(
            "{}{sep}{}{sep}{}",
            self.tenant_id,
            self.case_id,
            self.scope.as_str(),
            sep = SEPARATOR,
        );
        if let Some(dimension) = self.dimension {
            input.push(SEPARATOR);
            input.push_str(dimension.as_str());
        }

        let digest = hex::encode(Sha256::digest(input.as_bytes()));

        format!(
            "{NAMESPACE}{sep}{}{sep}{}{sep}{}{sep}{}",
            self.tenant_id,
            self.case_id,
            self.scope.as_str(),
            &digest[..DIGEST_LEN],
            sep = SEPARATOR,
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn scope_strategy() -> impl Strategy<Value = ContextScope> {
        prop_oneof![
            Just(ContextScope::Minimal),
            Just(ContextScope::Standard),
            Just(ContextScope::Comprehensive),
        ]
    }

    fn dimension_strategy() -> impl Strategy<Value = Option<Dimension>> {
        prop_oneof![
            Just(None),
            Just(Some(Dimension::Who)),
            Just(Some(Dimension::What)),
            Just(Some(Dimension::Where)),
            Just(Some(Dimension::When)),
            Just(Some(Dimension::Why)),
        ]
    }

    fn key_strategy() -> impl Strategy<Value = CacheKey> {
        (
            "[a-z0-9-]{1,24}",
            "[a-z0-9-]{1,24}",
            scope_strategy(),
            dimension_strategy(),
        )
            .prop_map(|(tenant, case, scope, dimension)| match dimension {
                Some(d) => CacheKey::for_dimension(&tenant, &case, scope, d),
                None => CacheKey::for_scope(&tenant, &case, scope),
            })
    }

    proptest! {
        /// Rendering is a pure function of the key fields.
        #[test]
        fn prop_render_deterministic(key in key_strategy()) {
            prop_assert_eq!(key.render(), key.clone().render());
        }

        /// Different keys never render to the same string.
        #[test]
        fn prop_render_injective(a in key_strategy(), b in key_strategy()) {
            if a == b {
                prop_assert_eq!(a.render(), b.render());
            } else {
                prop_assert_ne!(a.render(), b.render());
            }
        }

        /// The rendered key always carries the namespace and tenant prefix.
        #[test]
        fn prop_render_prefix(key in key_strategy()) {
            let rendered = key.render();
            prop_assert!(
                rendered.starts_with(&format!("ctx:{}:", key.tenant_id())),
                "rendered key missing namespace/tenant prefix"
            );
        }
    }
}
