//! Error types for CASELENS operations

use crate::enums::Dimension;
use thiserror::Error;

/// Client errors: bad input that must fail fast before any I/O.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown scope: {name:?}. Valid scopes: minimal, standard, comprehensive")]
    UnknownScope { name: String },

    #[error("Unknown dimension: {name:?}. Valid dimensions: WHO, WHAT, WHERE, WHEN, WHY")]
    UnknownDimension { name: String },

    #[error("Case-scoped call is missing a case id: {context}")]
    MissingCaseId { context: String },

    #[error("Required field missing or invalid: {field}")]
    MissingField { field: String },
}

/// Collaborator errors: an analyzer or one of its data sources failed.
///
/// During fan-out these are caught per-dimension and converted into an
/// absent dimension result; they never abort sibling analyzers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Graph query failed: {reason}")]
    GraphQuery { reason: String },

    #[error("Graph service unavailable: {reason}")]
    GraphUnavailable { reason: String },

    #[error("Relational lookup failed on {schema}.{table}: {reason}")]
    Relational {
        schema: String,
        table: String,
        reason: String,
    },

    #[error("{dimension} analyzer failed: {reason}")]
    AnalyzerFailed { dimension: Dimension, reason: String },

    #[error("{dimension} analyzer timed out")]
    Timeout { dimension: Dimension },
}

/// Cache errors. Every tier failure is caught and logged, then treated as
/// a miss or a no-op write: aggregation completes even with every tier
/// unreachable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache tier {tier} unavailable")]
    TierUnavailable { tier: String },

    #[error("Cache serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error("Cache tier {tier} backend error: {reason}")]
    Backend { tier: String, reason: String },
}

/// Master error type for all CASELENS errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Result type alias for CASELENS operations.
pub type ContextResult<T> = Result<T, ContextError>;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_unknown_scope() {
        let err = ValidationError::UnknownScope {
            name: "everything".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Unknown scope"));
        assert!(msg.contains("everything"));
        assert!(msg.contains("comprehensive"));
    }

    #[test]
    fn test_validation_error_display_unknown_dimension() {
        let err = ValidationError::UnknownDimension {
            name: "HOW".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Unknown dimension"));
        assert!(msg.contains("HOW"));
    }

    #[test]
    fn test_collaborator_error_display_analyzer_failed() {
        let err = CollaboratorError::AnalyzerFailed {
            dimension: Dimension::Who,
            reason: "connection refused".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("WHO"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_cache_error_display_backend() {
        let err = CacheError::Backend {
            tier: "distributed".to_string(),
            reason: "timeout".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("distributed"));
        assert!(msg.contains("timeout"));
    }

    #[test]
    fn test_context_error_from_variants() {
        let validation = ContextError::from(ValidationError::MissingCaseId {
            context: "graph query".to_string(),
        });
        assert!(matches!(validation, ContextError::Validation(_)));

        let collaborator = ContextError::from(CollaboratorError::GraphQuery {
            reason: "500".to_string(),
        });
        assert!(matches!(collaborator, ContextError::Collaborator(_)));

        let cache = ContextError::from(CacheError::LockPoisoned);
        assert!(matches!(cache, ContextError::Cache(_)));
    }
}
