//! Collaborator interfaces consumed by the dimension analyzers.
//!
//! Two external data sources feed every dimension: a graph-query service
//! (entity/relationship/community lookups) and a relational store
//! (structured record lookups). Both are abstract here - wire formats and
//! query dialects belong to the implementations, which are supplied by
//! the embedding application.

use async_trait::async_trait;
use caselens_core::{ContextResult, SearchMode, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A row returned by the relational store.
pub type Row = serde_json::Map<String, Value>;

// ============================================================================
// GRAPH QUERY COLLABORATOR
// ============================================================================

/// A query against the graph service.
///
/// Case-scoped (`LOCAL`) queries must carry a case id; building one
/// through [`GraphQuery::case_scoped`] makes that impossible to forget,
/// and [`GraphQuery::validate`] rejects a hand-built query that lacks it
/// before any I/O happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQuery {
    pub tenant_id: String,
    pub case_id: Option<String>,
    /// Natural-language query text
    pub text: String,
    pub mode: SearchMode,
    /// Restrict results to these entity types (empty = no restriction)
    #[serde(default)]
    pub entity_filter: Vec<String>,
}

impl GraphQuery {
    /// A case-scoped query. Always carries the case id.
    pub fn case_scoped(
        tenant_id: &str,
        case_id: &str,
        text: impl Into<String>,
        mode: SearchMode,
    ) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            case_id: Some(case_id.to_string()),
            text: text.into(),
            mode,
            entity_filter: Vec::new(),
        }
    }

    /// A tenant-wide query with no case scoping.
    pub fn global(tenant_id: &str, text: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            case_id: None,
            text: text.into(),
            mode: SearchMode::Global,
            entity_filter: Vec::new(),
        }
    }

    pub fn with_entity_filter(mut self, entity_types: Vec<String>) -> Self {
        self.entity_filter = entity_types;
        self
    }

    /// Fail fast on a case-scoped query without a case id. Silently
    /// querying unscoped data would be a tenant-isolation hole, so this
    /// is a programming error, not a degradable condition.
    pub fn validate(&self) -> ContextResult<()> {
        if self.mode.is_case_scoped() && self.case_id.is_none() {
            return Err(ValidationError::MissingCaseId {
                context: format!("{} graph query: {:?}", self.mode, self.text),
            }
            .into());
        }
        Ok(())
    }
}

/// An entity node returned by the graph service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEntity {
    pub entity_id: String,
    pub name: String,
    /// Uppercase entity type (PARTY, STATUTE_CITATION, PRECEDENT, ...)
    pub entity_type: String,
    /// Extraction confidence (0.0-1.0)
    pub confidence_score: f64,
    pub case_id: Option<String>,
    #[serde(default)]
    pub properties: Row,
}

/// A relationship edge returned by the graph service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelationship {
    pub relationship_id: String,
    pub source_entity_id: String,
    pub target_entity_id: String,
    /// CITES, REPRESENTS, DECIDED_CASE, ...
    pub relationship_type: String,
    pub confidence: f64,
    pub case_id: Option<String>,
    pub context: Option<String>,
}

/// A community cluster returned by the graph service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphCommunity {
    pub community_id: String,
    pub title: String,
    pub summary: String,
    pub size: usize,
    pub level: u32,
    #[serde(default)]
    pub entities: Vec<String>,
    pub coherence_score: f64,
}

/// Result of a graph query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphQueryResult {
    /// Generated response text, when the service produces one
    #[serde(default)]
    pub response_text: String,
    #[serde(default)]
    pub entities: Vec<GraphEntity>,
    #[serde(default)]
    pub relationships: Vec<GraphRelationship>,
    #[serde(default)]
    pub communities: Vec<GraphCommunity>,
}

impl GraphQueryResult {
    /// Entities of one type.
    pub fn entities_of_type<'a>(
        &'a self,
        entity_type: &'a str,
    ) -> impl Iterator<Item = &'a GraphEntity> {
        self.entities
            .iter()
            .filter(move |e| e.entity_type == entity_type)
    }
}

/// Graph database counts for a tenant or case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphStatsSnapshot {
    pub total_entities: u64,
    pub total_relationships: u64,
    pub total_communities: u64,
    pub total_documents: u64,
    #[serde(default)]
    pub entity_breakdown: HashMap<String, u64>,
}

/// Graph service health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub detail: String,
}

/// Client for the graph-query service.
#[async_trait]
pub trait GraphQueryClient: Send + Sync {
    /// Run a query. Implementations may assume `query.validate()` holds.
    async fn query(&self, query: &GraphQuery) -> ContextResult<GraphQueryResult>;

    /// Entity/relationship/community counts, optionally case-scoped.
    async fn graph_stats(
        &self,
        tenant_id: &str,
        case_id: Option<&str>,
    ) -> ContextResult<GraphStatsSnapshot>;

    /// Service health probe.
    async fn health(&self) -> ContextResult<HealthStatus>;
}

// ============================================================================
// RELATIONAL STORE COLLABORATOR
// ============================================================================

/// A filter predicate on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Column equals value
    Eq { column: String, value: Value },
    /// Column is one of the given values
    In { column: String, values: Vec<Value> },
}

/// A record lookup against (schema, table) with filter predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowQuery {
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub predicates: Vec<Predicate>,
}

impl RowQuery {
    pub fn new(schema: &str, table: &str) -> Self {
        Self {
            schema: schema.to_string(),
            table: table.to_string(),
            predicates: Vec::new(),
        }
    }

    /// Add an equality predicate.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// Add a membership predicate.
    pub fn is_in(mut self, column: &str, values: Vec<Value>) -> Self {
        self.predicates.push(Predicate::In {
            column: column.to_string(),
            values,
        });
        self
    }
}

/// Client for the relational store.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Fetch all rows matching the query.
    async fn fetch_rows(&self, query: &RowQuery) -> ContextResult<Vec<Row>>;

    /// Exact count of rows matching the query.
    async fn count_rows(&self, query: &RowQuery) -> ContextResult<u64>;
}

// ============================================================================
// TESTS
// ============================================================================
