//! End-to-end aggregation flow: real analyzers and a real tiered cache
//! over mock collaborators.

use async_trait::async_trait;
use caselens_cache::{CacheConfig, CacheTier, TierKind, TieredCacheManager};
use caselens_context::{
    ContextBuilder, ContextRequest, GraphEntity, GraphQuery, GraphQueryClient, GraphQueryResult,
    GraphStatsSnapshot, HealthStatus, RelationalStore, Row, RowQuery,
};
use caselens_core::{CaseStatus, ContextResult, ContextScope, Dimension};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

// ============================================================================
// TEST SUPPORT
// ============================================================================

#[derive(Default)]
struct MockStore {
    rows: RwLock<HashMap<String, Vec<Row>>>,
}

impl MockStore {
    fn load(&self, schema: &str, table: &str, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.rows
            .write()
            .unwrap()
            .insert(format!("{schema}.{table}"), rows);
    }
}

#[async_trait]
impl RelationalStore for MockStore {
    async fn fetch_rows(&self, query: &RowQuery) -> ContextResult<Vec<Row>> {
        let key = format!("{}.{}", query.schema, query.table);
        Ok(self.rows.read().unwrap().get(&key).cloned().unwrap_or_default())
    }

    async fn count_rows(&self, query: &RowQuery) -> ContextResult<u64> {
        Ok(self.fetch_rows(query).await?.len() as u64)
    }
}

struct MockGraph {
    result: GraphQueryResult,
}

#[async_trait]
impl GraphQueryClient for MockGraph {
    async fn query(&self, query: &GraphQuery) -> ContextResult<GraphQueryResult> {
        query.validate()?;
        Ok(self.result.clone())
    }

    async fn graph_stats(
        &self,
        _tenant_id: &str,
        _case_id: Option<&str>,
    ) -> ContextResult<GraphStatsSnapshot> {
        Ok(GraphStatsSnapshot::default())
    }

    async fn health(&self) -> ContextResult<HealthStatus> {
        Ok(HealthStatus {
            healthy: true,
            detail: "ok".to_string(),
        })
    }
}

/// Minimal in-memory distributed tier.
#[derive(Default)]
struct MapTier {
    entries: RwLock<HashMap<String, Value>>,
}

#[async_trait]
impl CacheTier for MapTier {
    fn kind(&self) -> TierKind {
        TierKind::Distributed
    }

    async fn get(&self, key: &str) -> ContextResult<Option<Value>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value, _ttl: Duration) -> ContextResult<()> {
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> ContextResult<bool> {
        Ok(self.entries.write().unwrap().remove(key).is_some())
    }
}

fn node(entity_type: &str, id: &str, props: Value) -> Value {
    json!({"node_id": id, "entity_type": entity_type, "properties": props})
}

fn precedent(id: &str, name: &str, category: &str) -> GraphEntity {
    GraphEntity {
        entity_id: id.to_string(),
        name: name.to_string(),
        entity_type: "PRECEDENT".to_string(),
        confidence_score: 0.9,
        case_id: Some("case-1".to_string()),
        properties: match json!({
            "category": category,
            "citation": "1 F.3d 2",
            "relevance": 0.8,
            "holding": "held something",
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        },
    }
}

/// A store loaded with enough data that every dimension reaches full
/// score.
fn rich_store() -> Arc<MockStore> {
    let store = MockStore::default();

    let mut nodes = Vec::new();
    for i in 0..4 {
        nodes.push(node(
            "PARTY",
            &format!("p-{i}"),
            json!({"name": format!("Party {i}"), "role": "plaintiff"}),
        ));
    }
    for i in 0..2 {
        nodes.push(node(
            "JUDGE",
            &format!("j-{i}"),
            json!({"name": format!("Judge {i}"), "court": "N.D. Cal."}),
        ));
        nodes.push(node(
            "ATTORNEY",
            &format!("a-{i}"),
            json!({"name": format!("Attorney {i}"), "representing": [format!("p-{i}")]}),
        ));
        nodes.push(node(
            "WITNESS",
            &format!("w-{i}"),
            json!({"name": format!("Witness {i}"), "witness_type": "fact"}),
        ));
    }
    for i in 0..3 {
        nodes.push(node(
            "CAUSE_OF_ACTION",
            &format!("c-{i}"),
            json!({"name": format!("Cause {i}"), "description": "..."}),
        ));
        nodes.push(node(
            "LEGAL_PRINCIPLE",
            &format!("l-{i}"),
            json!({"name": format!("Principle {i}")}),
        ));
    }
    for i in 0..2 {
        nodes.push(node(
            "STATUTE_CITATION",
            &format!("s-{i}"),
            json!({"text": format!("{i} U.S.C. § 1")}),
        ));
        nodes.push(node(
            "CASE_CITATION",
            &format!("cc-{i}"),
            json!({"text": format!("Foo v. Bar {i}")}),
        ));
    }
    store.load("graph", "nodes", nodes);

    let filed = Utc::now() - chrono::Duration::days(120);
    store.load(
        "client",
        "client_cases",
        vec![json!({
            "id": "case-1",
            "case_name": "Acme v. Widget",
            "jurisdiction": "Federal",
            "court": "N.D. Cal.",
            "venue": "San Francisco",
            "filing_date": filed.to_rfc3339(),
        })],
    );

    let events: Vec<Value> = (0..5)
        .map(|i| {
            json!({
                "event_date": (filed + chrono::Duration::days(i * 10)).to_rfc3339(),
                "event_type": "filing",
                "description": format!("event {i}"),
            })
        })
        .collect();
    store.load("client", "case_events", events);

    let deadlines: Vec<Value> = (0..5)
        .map(|i| {
            json!({
                "deadline_date": (Utc::now() + chrono::Duration::days(40 + i)).to_rfc3339(),
                "deadline_type": "discovery",
                "description": format!("deadline {i}"),
            })
        })
        .collect();
    store.load("client", "case_deadlines", deadlines);

    Arc::new(store)
}

fn rich_graph() -> Arc<MockGraph> {
    let entities = (0..10)
        .map(|i| {
            let category = if i < 7 { "supporting" } else { "opposing" };
            precedent(&format!("pr-{i}"), &format!("Precedent {i}"), category)
        })
        .collect();
    Arc::new(MockGraph {
        result: GraphQueryResult {
            entities,
            ..Default::default()
        },
    })
}

fn build_engine() -> (ContextBuilder, Arc<MapTier>) {
    let distributed = Arc::new(MapTier::default());
    let cache = Arc::new(
        TieredCacheManager::new(CacheConfig::default()).with_distributed(distributed.clone()),
    );
    let builder = ContextBuilder::from_clients(rich_graph(), rich_store(), cache);
    (builder, distributed)
}

// ============================================================================
// FLOW TESTS
// ============================================================================

#[tokio::test]
async fn test_full_build_scores_complete_and_writes_through() {
    let (builder, distributed) = build_engine();
    let request = ContextRequest::new("client-1", "case-1");

    let response = builder.build_context(&request).await.unwrap();

    assert_eq!(response.dimension_count(), 5);
    assert_eq!(response.case_name, "Acme v. Widget");
    assert!(response.is_complete, "score was {}", response.context_score);
    assert!(!response.cached);

    let who = response.who.as_ref().unwrap();
    assert_eq!(who.data_points(), 10);
    let when = response.when.as_ref().unwrap();
    assert_eq!(when.upcoming_deadlines.len(), 5);
    assert!(when.case_age_days >= 119);

    // Write-through reached both the fast and the distributed tier.
    assert_eq!(builder.cache_manager().stats().total_sets, 1);
    assert_eq!(distributed.entries.read().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cache_round_trip_and_invalidation() {
    let (builder, _distributed) = build_engine();
    let request = ContextRequest::new("client-1", "case-1");

    let first = builder.build_context(&request).await.unwrap();
    let second = builder.build_context(&request).await.unwrap();
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(second.query_id, first.query_id);

    let removed = builder
        .cache_manager()
        .invalidate_case("client-1", "case-1")
        .await;
    assert!(removed >= 1);

    let third = builder.build_context(&request).await.unwrap();
    assert!(!third.cached);
    assert_ne!(third.query_id, first.query_id);
}

#[tokio::test]
async fn test_distributed_tier_survives_fast_tier_loss() {
    // Simulate a fresh process: same distributed tier, new manager.
    let distributed = Arc::new(MapTier::default());
    let store = rich_store();
    let graph = rich_graph();

    let cache = Arc::new(
        TieredCacheManager::new(CacheConfig::default()).with_distributed(distributed.clone()),
    );
    let builder = ContextBuilder::from_clients(graph.clone(), store.clone(), cache);
    let request = ContextRequest::new("client-1", "case-1");
    builder.build_context(&request).await.unwrap();

    let cache = Arc::new(
        TieredCacheManager::new(CacheConfig::default()).with_distributed(distributed.clone()),
    );
    let builder = ContextBuilder::from_clients(graph, store, cache);
    let revived = builder.build_context(&request).await.unwrap();

    // Served from the shared tier, then promoted into the new fast tier.
    assert!(revived.cached);
    let stats = builder.cache_manager().stats();
    assert_eq!(stats.distributed.hits, 1);
    assert_eq!(stats.memory.misses, 1);
}

#[tokio::test]
async fn test_scoped_build_uses_scoped_cache_key() {
    let (builder, _distributed) = build_engine();

    let minimal = ContextRequest::new("client-1", "case-1").with_scope(ContextScope::Minimal);
    let comprehensive = ContextRequest::new("client-1", "case-1");

    let minimal_response = builder.build_context(&minimal).await.unwrap();
    assert_eq!(minimal_response.dimension_count(), 2);

    // The comprehensive build must not be served the minimal composite.
    let full_response = builder.build_context(&comprehensive).await.unwrap();
    assert!(!full_response.cached);
    assert_eq!(full_response.dimension_count(), 5);
}

#[tokio::test]
async fn test_refresh_and_quality_flow() {
    let (builder, _distributed) = build_engine();

    let data = builder
        .refresh_dimension("client-1", "case-1", Dimension::Why)
        .await
        .unwrap();
    assert_eq!(data.dimension(), Dimension::Why);
    assert_eq!(data.data_points(), 10);

    let metrics = builder
        .dimension_quality("client-1", "case-1", Dimension::Who)
        .await
        .unwrap();
    assert_eq!(metrics.dimension, Dimension::Who);
    assert!(metrics.is_sufficient);
}

#[tokio::test]
async fn test_closed_case_write_uses_long_ttl_path() {
    let (builder, distributed) = build_engine();
    let request = ContextRequest::new("client-1", "case-1").with_case_status(CaseStatus::Closed);

    builder.build_context(&request).await.unwrap();
    // The distributed tier received the write regardless of status.
    assert_eq!(distributed.entries.read().unwrap().len(), 1);
}
