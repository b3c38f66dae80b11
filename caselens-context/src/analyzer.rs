//! Dimension analyzers for WHO/WHAT/WHERE/WHEN/WHY context construction.
//!
//! Each analyzer resolves one dimension by querying the graph service
//! and/or the relational store and transforming raw results into that
//! dimension's model. A failure of an analyzer's primary data source
//! propagates as an error (the aggregator turns it into an absent
//! dimension); enrichment sources fail open with a logged warning and
//! empty collections.
//!
//! All analyzers are case-scoped: every query carries both the tenant id
//! and the case id.

use crate::clients::{GraphQuery, GraphQueryClient, GraphQueryResult, RelationalStore, Row, RowQuery};
use async_trait::async_trait;
use caselens_core::{
    Attorney, CauseOfAction, Citation, CitationKind, ContextResult, Deadline, DeadlinePriority,
    Dimension, DimensionData, Favorability, Judge, LegalTheory, LocalRule, Party,
    PrecedentAnalysis, SearchMode, TimelineEvent, Timestamp, WhatContext, WhenContext,
    WhereContext, WhoContext, WhyContext, Witness,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entity types that belong to the WHO dimension.
const PEOPLE_ENTITY_TYPES: [&str; 4] = ["PARTY", "JUDGE", "ATTORNEY", "WITNESS"];

/// Entity types that belong to the WHAT dimension.
const LEGAL_ENTITY_TYPES: [&str; 5] = [
    "STATUTE_CITATION",
    "CASE_CITATION",
    "LEGAL_PRINCIPLE",
    "CAUSE_OF_ACTION",
    "DOCTRINE",
];

/// Graph entity type carrying precedent analyses for the WHY dimension.
const PRECEDENT_ENTITY_TYPE: &str = "PRECEDENT";

// ============================================================================
// ANALYZER TRAIT AND DISPATCH TABLE
// ============================================================================

/// One dimension's analyzer.
///
/// Analyzer instances are shared, read-mostly handles: they hold
/// collaborator clients and no per-request state, so one instance serves
/// every concurrent request.
#[async_trait]
pub trait DimensionAnalyzer: Send + Sync {
    /// The dimension this analyzer resolves.
    fn dimension(&self) -> Dimension;

    /// Build this dimension's context for a case.
    async fn analyze(&self, tenant_id: &str, case_id: &str) -> ContextResult<DimensionData>;
}

/// Fixed table mapping every [`Dimension`] to its analyzer instance.
pub struct AnalyzerSet {
    analyzers: [Arc<dyn DimensionAnalyzer>; 5],
}

impl AnalyzerSet {
    /// Wire the five standard analyzers to the given collaborators.
    pub fn new(graph: Arc<dyn GraphQueryClient>, store: Arc<dyn RelationalStore>) -> Self {
        Self {
            analyzers: [
                Arc::new(WhoAnalyzer::new(graph.clone(), store.clone())),
                Arc::new(WhatAnalyzer::new(store.clone())),
                Arc::new(WhereAnalyzer::new(store.clone())),
                Arc::new(WhenAnalyzer::new(store.clone())),
                Arc::new(WhyAnalyzer::new(graph, store)),
            ],
        }
    }

    /// Build a set from explicit analyzer instances, one per dimension in
    /// canonical order.
    pub fn from_analyzers(analyzers: [Arc<dyn DimensionAnalyzer>; 5]) -> Self {
        debug_assert!(analyzers
            .iter()
            .zip(Dimension::ALL)
            .all(|(analyzer, dimension)| analyzer.dimension() == dimension));
        Self { analyzers }
    }

    /// The analyzer for a dimension.
    pub fn analyzer(&self, dimension: Dimension) -> Arc<dyn DimensionAnalyzer> {
        self.analyzers[slot(dimension)].clone()
    }
}

fn slot(dimension: Dimension) -> usize {
    match dimension {
        Dimension::Who => 0,
        Dimension::What => 1,
        Dimension::Where => 2,
        Dimension::When => 3,
        Dimension::Why => 4,
    }
}

// ============================================================================
// SHARED EXTRACTION HELPERS
// ============================================================================

fn placeholder_name(case_id: &str) -> String {
    format!("Case {case_id}")
}

/// The `properties` sub-object of a node row, empty if absent.
fn row_properties(row: &Row) -> Row {
    row.get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn str_field(map: &Row, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn str_field_or(map: &Row, key: &str, default: &str) -> String {
    str_field(map, key).unwrap_or_else(|| default.to_string())
}

fn f64_field_or(map: &Row, key: &str, default: f64) -> f64 {
    map.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn bool_field(map: &Row, key: &str) -> bool {
    map.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn string_list_field(map: &Row, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn timestamp_field(map: &Row, key: &str) -> Option<Timestamp> {
    str_field(map, key)
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Node rows of the given entity types for one case.
fn node_query(tenant_id: &str, case_id: &str, entity_types: &[&str]) -> RowQuery {
    RowQuery::new("graph", "nodes")
        .eq("client_id", tenant_id)
        .eq("case_id", case_id)
        .is_in(
            "entity_type",
            entity_types.iter().map(|t| json!(t)).collect(),
        )
}

/// The case metadata row, if the case is known to the relational store.
async fn case_metadata_row(
    store: &dyn RelationalStore,
    tenant_id: &str,
    case_id: &str,
) -> ContextResult<Option<Row>> {
    let query = RowQuery::new("client", "client_cases")
        .eq("client_id", tenant_id)
        .eq("id", case_id);
    let mut rows = store.fetch_rows(&query).await?;
    Ok(if rows.is_empty() {
        None
    } else {
        Some(rows.swap_remove(0))
    })
}

/// Display name for a case, falling back to a formatted case id.
/// Lookup failures degrade to the fallback.
async fn case_display_name(store: &dyn RelationalStore, tenant_id: &str, case_id: &str) -> String {
    match case_metadata_row(store, tenant_id, case_id).await {
        Ok(Some(row)) => {
            str_field(&row, "case_name").unwrap_or_else(|| placeholder_name(case_id))
        }
        Ok(None) => placeholder_name(case_id),
        Err(err) => {
            warn!(case_id, error = %err, "case name lookup failed");
            placeholder_name(case_id)
        }
    }
}

// ============================================================================
// WHO ANALYZER - Parties, Judges, Attorneys, Witnesses
// ============================================================================

/// Resolves the WHO dimension: parties, judges, attorneys, witnesses,
/// and the relationships between them.
pub struct WhoAnalyzer {
    graph: Arc<dyn GraphQueryClient>,
    store: Arc<dyn RelationalStore>,
}

impl WhoAnalyzer {
    pub fn new(graph: Arc<dyn GraphQueryClient>, store: Arc<dyn RelationalStore>) -> Self {
        Self { graph, store }
    }

    /// Graph entities for the case; enrichment only, so failures degrade
    /// to an empty result.
    async fn query_graph(&self, tenant_id: &str, case_id: &str) -> GraphQueryResult {
        let query = GraphQuery::case_scoped(
            tenant_id,
            case_id,
            format!("Find all parties, judges, attorneys, and witnesses in case {case_id}"),
            SearchMode::Local,
        )
        .with_entity_filter(PEOPLE_ENTITY_TYPES.iter().map(|t| t.to_string()).collect());

        match self.graph.query(&query).await {
            Ok(result) => result,
            Err(err) => {
                warn!(case_id, error = %err, "graph query failed; continuing without it");
                GraphQueryResult::default()
            }
        }
    }

    /// source node id → related node ids, from the edges table.
    async fn party_relationships(
        &self,
        tenant_id: &str,
        case_id: &str,
    ) -> HashMap<String, Vec<String>> {
        let query = RowQuery::new("graph", "edges")
            .eq("client_id", tenant_id)
            .eq("case_id", case_id);

        let mut relationships: HashMap<String, Vec<String>> = HashMap::new();
        match self.store.fetch_rows(&query).await {
            Ok(rows) => {
                for edge in rows {
                    let (Some(source), Some(target)) = (
                        str_field(&edge, "source_node_id"),
                        str_field(&edge, "target_node_id"),
                    ) else {
                        continue;
                    };
                    relationships.entry(source).or_default().push(target);
                }
            }
            Err(err) => {
                warn!(case_id, error = %err, "failed to build party relationships");
            }
        }
        relationships
    }
}

fn extract_parties(nodes: &[Row], case_id: &str) -> Vec<Party> {
    nodes
        .iter()
        .filter(|node| str_field(node, "entity_type").as_deref() == Some("PARTY"))
        .map(|node| {
            let props = row_properties(node);
            Party {
                id: str_field_or(node, "node_id", ""),
                name: str_field_or(&props, "name", "Unknown Party"),
                role: str_field_or(&props, "role", "unknown"),
                entity_type: str_field_or(&props, "entity_type", "person"),
                case_id: case_id.to_string(),
                metadata: props,
            }
        })
        .collect()
}

fn extract_judges(nodes: &[Row], case_id: &str) -> Vec<Judge> {
    nodes
        .iter()
        .filter(|node| str_field(node, "entity_type").as_deref() == Some("JUDGE"))
        .map(|node| {
            let props = row_properties(node);
            Judge {
                id: str_field_or(node, "node_id", ""),
                name: str_field_or(&props, "name", "Unknown Judge"),
                court: str_field_or(&props, "court", "Unknown Court"),
                case_id: case_id.to_string(),
                assignment_date: timestamp_field(&props, "assignment_date"),
                history_with_parties: HashMap::new(),
            }
        })
        .collect()
}

fn extract_attorneys(nodes: &[Row], case_id: &str) -> Vec<Attorney> {
    nodes
        .iter()
        .filter(|node| str_field(node, "entity_type").as_deref() == Some("ATTORNEY"))
        .map(|node| {
            let props = row_properties(node);
            Attorney {
                id: str_field_or(node, "node_id", ""),
                name: str_field_or(&props, "name", "Unknown Attorney"),
                firm: str_field(&props, "firm"),
                bar_number: str_field(&props, "bar_number"),
                representing: string_list_field(&props, "representing"),
                case_id: case_id.to_string(),
            }
        })
        .collect()
}

fn extract_witnesses(nodes: &[Row], case_id: &str) -> Vec<Witness> {
    nodes
        .iter()
        .filter(|node| str_field(node, "entity_type").as_deref() == Some("WITNESS"))
        .map(|node| {
            let props = row_properties(node);
            Witness {
                id: str_field_or(node, "node_id", ""),
                name: str_field_or(&props, "name", "Unknown Witness"),
                witness_type: str_field_or(&props, "witness_type", "fact"),
                representing_party: str_field(&props, "representing_party"),
                case_id: case_id.to_string(),
                expertise: str_field(&props, "expertise"),
            }
        })
        .collect()
}

/// Fold graph-service entities into the structured results, skipping
/// names the relational store already produced.
fn merge_graph_people(
    graph_result: &GraphQueryResult,
    case_id: &str,
    parties: &mut Vec<Party>,
    witnesses: &mut Vec<Witness>,
) {
    let known: HashSet<String> = parties
        .iter()
        .map(|p| p.name.to_lowercase())
        .chain(witnesses.iter().map(|w| w.name.to_lowercase()))
        .collect();

    for entity in &graph_result.entities {
        if known.contains(&entity.name.to_lowercase()) {
            continue;
        }
        match entity.entity_type.as_str() {
            "PARTY" => parties.push(Party {
                id: entity.entity_id.clone(),
                name: entity.name.clone(),
                role: str_field_or(&entity.properties, "role", "unknown"),
                entity_type: str_field_or(&entity.properties, "entity_type", "person"),
                case_id: case_id.to_string(),
                metadata: entity.properties.clone(),
            }),
            "WITNESS" => witnesses.push(Witness {
                id: entity.entity_id.clone(),
                name: entity.name.clone(),
                witness_type: str_field_or(&entity.properties, "witness_type", "fact"),
                representing_party: str_field(&entity.properties, "representing_party"),
                case_id: case_id.to_string(),
                expertise: str_field(&entity.properties, "expertise"),
            }),
            _ => {}
        }
    }
}

/// party id → attorney id, from attorney representation lists.
fn representation_map(attorneys: &[Attorney]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for attorney in attorneys {
        for party_id in &attorney.representing {
            map.insert(party_id.clone(), attorney.id.clone());
        }
    }
    map
}

#[async_trait]
impl DimensionAnalyzer for WhoAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Who
    }

    async fn analyze(&self, tenant_id: &str, case_id: &str) -> ContextResult<DimensionData> {
        debug!(case_id, "analyzing WHO dimension");

        let nodes = self
            .store
            .fetch_rows(&node_query(tenant_id, case_id, &PEOPLE_ENTITY_TYPES))
            .await?;
        let graph_result = self.query_graph(tenant_id, case_id).await;

        let mut parties = extract_parties(&nodes, case_id);
        let judges = extract_judges(&nodes, case_id);
        let attorneys = extract_attorneys(&nodes, case_id);
        let mut witnesses = extract_witnesses(&nodes, case_id);
        merge_graph_people(&graph_result, case_id, &mut parties, &mut witnesses);

        let party_relationships = self.party_relationships(tenant_id, case_id).await;
        let representation_map = representation_map(&attorneys);
        let case_name = case_display_name(self.store.as_ref(), tenant_id, case_id).await;

        info!(
            case_id,
            parties = parties.len(),
            judges = judges.len(),
            attorneys = attorneys.len(),
            "WHO analysis complete"
        );

        Ok(DimensionData::Who(WhoContext {
            case_id: case_id.to_string(),
            case_name,
            parties,
            judges,
            attorneys,
            witnesses,
            party_relationships,
            representation_map,
        }))
    }
}

// ============================================================================
// WHAT ANALYZER - Legal Issues, Claims, Citations
// ============================================================================

/// Resolves the WHAT dimension: causes of action, legal issues,
/// doctrines, and statute/case citations.
pub struct WhatAnalyzer {
    store: Arc<dyn RelationalStore>,
}

impl WhatAnalyzer {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self { store }
    }
}

fn extract_causes_of_action(nodes: &[Row], case_id: &str) -> Vec<CauseOfAction> {
    nodes
        .iter()
        .filter(|node| str_field(node, "entity_type").as_deref() == Some("CAUSE_OF_ACTION"))
        .map(|node| {
            let props = row_properties(node);
            CauseOfAction {
                id: str_field_or(node, "node_id", ""),
                name: str_field_or(&props, "name", "Unknown Cause"),
                description: str_field_or(&props, "description", ""),
                elements: string_list_field(&props, "elements"),
                case_id: case_id.to_string(),
            }
        })
        .collect()
}

/// Name-or-text values of the given entity type, deduplicated with the
/// first occurrence winning.
fn extract_named_values(nodes: &[Row], entity_type: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for node in nodes {
        if str_field(node, "entity_type").as_deref() != Some(entity_type) {
            continue;
        }
        let props = row_properties(node);
        let Some(value) = str_field(&props, "name").or_else(|| str_field(&props, "text")) else {
            continue;
        };
        if seen.insert(value.clone()) {
            values.push(value);
        }
    }
    values
}

fn extract_citations(nodes: &[Row], entity_type: &str, kind: CitationKind, case_id: &str) -> Vec<Citation> {
    nodes
        .iter()
        .filter(|node| str_field(node, "entity_type").as_deref() == Some(entity_type))
        .map(|node| {
            let props = row_properties(node);
            Citation {
                text: str_field_or(&props, "text", ""),
                kind,
                jurisdiction: str_field_or(&props, "jurisdiction", "federal"),
                confidence: f64_field_or(&props, "confidence", 0.9),
                case_id: Some(case_id.to_string()),
            }
        })
        .collect()
}

/// More causes, issues, and statutes mean a more complex matter; 20
/// combined items is treated as maximal.
fn issue_complexity(cause_count: usize, issue_count: usize, statute_count: usize) -> f64 {
    let total = cause_count + issue_count + statute_count;
    (total as f64 / 20.0).min(1.0)
}

#[async_trait]
impl DimensionAnalyzer for WhatAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::What
    }

    async fn analyze(&self, tenant_id: &str, case_id: &str) -> ContextResult<DimensionData> {
        debug!(case_id, "analyzing WHAT dimension");

        let nodes = self
            .store
            .fetch_rows(&node_query(tenant_id, case_id, &LEGAL_ENTITY_TYPES))
            .await?;

        let causes_of_action = extract_causes_of_action(&nodes, case_id);
        let legal_issues = extract_named_values(&nodes, "LEGAL_PRINCIPLE");
        let doctrines = extract_named_values(&nodes, "DOCTRINE");
        let statutes = extract_citations(&nodes, "STATUTE_CITATION", CitationKind::Statute, case_id);
        let case_citations =
            extract_citations(&nodes, "CASE_CITATION", CitationKind::CaseLaw, case_id);

        let primary_legal_theory = causes_of_action
            .first()
            .map(|c| c.name.clone())
            .or_else(|| legal_issues.first().cloned());
        let issue_complexity =
            issue_complexity(causes_of_action.len(), legal_issues.len(), statutes.len());
        let case_name = case_display_name(self.store.as_ref(), tenant_id, case_id).await;

        info!(
            case_id,
            causes = causes_of_action.len(),
            statutes = statutes.len(),
            case_citations = case_citations.len(),
            "WHAT analysis complete"
        );

        Ok(DimensionData::What(WhatContext {
            case_id: case_id.to_string(),
            case_name,
            causes_of_action,
            legal_issues,
            doctrines,
            statutes,
            case_citations,
            primary_legal_theory,
            issue_complexity,
            jurisdiction_type: "federal".to_string(),
        }))
    }
}

// ============================================================================
// WHERE ANALYZER - Jurisdiction, Venue, Court
// ============================================================================

/// Resolves the WHERE dimension: jurisdiction, court, venue, and local
/// rules.
pub struct WhereAnalyzer {
    store: Arc<dyn RelationalStore>,
}

impl WhereAnalyzer {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self { store }
    }

    /// Local rules for the jurisdiction; reference data, so failures
    /// degrade to none.
    async fn local_rules(&self, jurisdiction: &str) -> Vec<LocalRule> {
        let query = RowQuery::new("reference", "local_rules").eq("jurisdiction", jurisdiction);
        match self.store.fetch_rows(&query).await {
            Ok(rows) => rows
                .iter()
                .map(|row| LocalRule {
                    rule_number: str_field_or(row, "rule_number", ""),
                    description: str_field_or(row, "description", ""),
                    jurisdiction: jurisdiction.to_string(),
                })
                .collect(),
            Err(err) => {
                warn!(jurisdiction, error = %err, "local rules lookup failed");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl DimensionAnalyzer for WhereAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Where
    }

    async fn analyze(&self, tenant_id: &str, case_id: &str) -> ContextResult<DimensionData> {
        debug!(case_id, "analyzing WHERE dimension");

        let case_data = case_metadata_row(self.store.as_ref(), tenant_id, case_id)
            .await?
            .unwrap_or_default();

        let primary_jurisdiction = str_field_or(&case_data, "jurisdiction", "Unknown");
        let court = str_field_or(&case_data, "court", "Unknown Court");
        let venue = str_field_or(&case_data, "venue", "Unknown Venue");
        let judge_chambers = str_field(&case_data, "judge_chambers");
        let local_rules = self.local_rules(&primary_jurisdiction).await;
        let case_name =
            str_field(&case_data, "case_name").unwrap_or_else(|| placeholder_name(case_id));

        info!(case_id, %primary_jurisdiction, %court, "WHERE analysis complete");

        Ok(DimensionData::Where(WhereContext {
            case_id: case_id.to_string(),
            case_name,
            primary_jurisdiction,
            court,
            venue,
            judge_chambers,
            local_rules,
            filing_requirements: Vec::new(),
            related_proceedings: Vec::new(),
        }))
    }
}

// ============================================================================
// WHEN ANALYZER - Timeline, Deadlines
// ============================================================================

/// Resolves the WHEN dimension: filing date, timeline, deadlines, case
/// age, and urgency.
pub struct WhenAnalyzer {
    store: Arc<dyn RelationalStore>,
}

impl WhenAnalyzer {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self { store }
    }

    async fn timeline(&self, tenant_id: &str, case_id: &str) -> Vec<TimelineEvent> {
        let query = RowQuery::new("client", "case_events")
            .eq("client_id", tenant_id)
            .eq("case_id", case_id);
        match self.store.fetch_rows(&query).await {
            Ok(rows) => rows
                .iter()
                .filter_map(|row| {
                    Some(TimelineEvent {
                        date: timestamp_field(row, "event_date")?,
                        event_type: str_field_or(row, "event_type", "filing"),
                        description: str_field_or(row, "description", ""),
                        case_id: case_id.to_string(),
                    })
                })
                .collect(),
            Err(err) => {
                warn!(case_id, error = %err, "timeline lookup failed");
                Vec::new()
            }
        }
    }

    async fn deadlines(&self, tenant_id: &str, case_id: &str) -> Vec<Deadline> {
        let query = RowQuery::new("client", "case_deadlines")
            .eq("client_id", tenant_id)
            .eq("case_id", case_id);
        match self.store.fetch_rows(&query).await {
            Ok(rows) => rows
                .iter()
                .filter_map(|row| {
                    Some(Deadline {
                        deadline_date: timestamp_field(row, "deadline_date")?,
                        deadline_type: str_field_or(row, "deadline_type", "motion"),
                        description: str_field_or(row, "description", ""),
                        case_id: case_id.to_string(),
                        is_met: bool_field(row, "is_met"),
                        priority: parse_priority(str_field(row, "priority").as_deref()),
                    })
                })
                .collect(),
            Err(err) => {
                warn!(case_id, error = %err, "deadline lookup failed");
                Vec::new()
            }
        }
    }
}

fn parse_priority(value: Option<&str>) -> DeadlinePriority {
    match value.map(str::to_lowercase).as_deref() {
        Some("high") => DeadlinePriority::High,
        Some("low") => DeadlinePriority::Low,
        _ => DeadlinePriority::default(),
    }
}

/// Urgency from upcoming deadlines: an imminent one (within 7 days) is
/// maximal, within 30 days is high, anything further is medium, no
/// deadlines at all is low.
fn urgency_score(upcoming: &[Deadline]) -> f64 {
    if upcoming.is_empty() {
        return 0.3;
    }
    let now = Utc::now();
    let days_to = |deadline: &Deadline| {
        deadline
            .deadline_date
            .signed_duration_since(now)
            .num_days()
    };
    if upcoming.iter().any(|d| days_to(d) <= 7) {
        1.0
    } else if upcoming.iter().any(|d| days_to(d) <= 30) {
        0.7
    } else {
        0.5
    }
}

#[async_trait]
impl DimensionAnalyzer for WhenAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::When
    }

    async fn analyze(&self, tenant_id: &str, case_id: &str) -> ContextResult<DimensionData> {
        debug!(case_id, "analyzing WHEN dimension");

        let case_data = case_metadata_row(self.store.as_ref(), tenant_id, case_id)
            .await?
            .unwrap_or_default();
        let timeline = self.timeline(tenant_id, case_id).await;
        let deadlines = self.deadlines(tenant_id, case_id).await;

        let now = Utc::now();
        let (upcoming_deadlines, past_deadlines): (Vec<Deadline>, Vec<Deadline>) = deadlines
            .into_iter()
            .partition(|d| d.deadline_date > now);

        let filing_date = timestamp_field(&case_data, "filing_date");
        let case_age_days = filing_date
            .map(|filed| now.signed_duration_since(filed).num_days().max(0))
            .unwrap_or(0);
        let days_until_next_deadline = upcoming_deadlines
            .iter()
            .map(|d| d.deadline_date)
            .min()
            .map(|next| next.signed_duration_since(now).num_days());
        let urgency_score = urgency_score(&upcoming_deadlines);
        let case_name =
            str_field(&case_data, "case_name").unwrap_or_else(|| placeholder_name(case_id));

        info!(
            case_id,
            events = timeline.len(),
            upcoming = upcoming_deadlines.len(),
            "WHEN analysis complete"
        );

        Ok(DimensionData::When(WhenContext {
            case_id: case_id.to_string(),
            case_name,
            filing_date,
            incident_date: timestamp_field(&case_data, "incident_date"),
            timeline,
            upcoming_deadlines,
            past_deadlines,
            discovery_cutoff: timestamp_field(&case_data, "discovery_cutoff"),
            motion_deadline: timestamp_field(&case_data, "motion_deadline"),
            trial_date: timestamp_field(&case_data, "trial_date"),
            statute_of_limitations: timestamp_field(&case_data, "statute_of_limitations"),
            days_until_next_deadline,
            urgency_score,
            case_age_days,
        }))
    }
}

// ============================================================================
// WHY ANALYZER - Legal Reasoning, Precedents
// ============================================================================

/// Resolves the WHY dimension: legal theories, precedent analyses, and
/// argument strength.
pub struct WhyAnalyzer {
    graph: Arc<dyn GraphQueryClient>,
    store: Arc<dyn RelationalStore>,
}

impl WhyAnalyzer {
    pub fn new(graph: Arc<dyn GraphQueryClient>, store: Arc<dyn RelationalStore>) -> Self {
        Self { graph, store }
    }

    /// Legal theories from structured nodes; enrichment only.
    async fn legal_theories(&self, tenant_id: &str, case_id: &str) -> Vec<LegalTheory> {
        let query = node_query(tenant_id, case_id, &["LEGAL_THEORY"]);
        match self.store.fetch_rows(&query).await {
            Ok(rows) => rows
                .iter()
                .filter(|node| str_field(node, "entity_type").as_deref() == Some("LEGAL_THEORY"))
                .map(|node| {
                    let props = row_properties(node);
                    LegalTheory {
                        id: str_field_or(node, "node_id", ""),
                        name: str_field_or(&props, "name", "Unknown Theory"),
                        description: str_field_or(&props, "description", ""),
                        strength: f64_field_or(&props, "strength", 0.5),
                        supporting_precedents: string_list_field(&props, "supporting_precedents"),
                        case_id: case_id.to_string(),
                    }
                })
                .collect(),
            Err(err) => {
                warn!(case_id, error = %err, "legal theory lookup failed");
                Vec::new()
            }
        }
    }
}

/// Precedent analyses of one favorability category from graph entities.
fn categorize_precedents(result: &GraphQueryResult, favorability: Favorability) -> Vec<PrecedentAnalysis> {
    let category = match favorability {
        Favorability::Supporting => "supporting",
        Favorability::Opposing => "opposing",
        Favorability::Neutral => "neutral",
    };

    result
        .entities_of_type(PRECEDENT_ENTITY_TYPE)
        .filter(|entity| {
            str_field(&entity.properties, "category").as_deref() == Some(category)
        })
        .map(|entity| PrecedentAnalysis {
            case_name: entity.name.clone(),
            citation: str_field_or(&entity.properties, "citation", ""),
            relevance_score: f64_field_or(&entity.properties, "relevance", 0.5),
            holding: str_field_or(&entity.properties, "holding", ""),
            distinguishing_factors: string_list_field(&entity.properties, "distinguishing_factors"),
            favorability,
        })
        .collect()
}

/// Supporting relevance mass over total relevance mass; 0.5 when there
/// is nothing to weigh.
fn argument_strength(supporting: &[PrecedentAnalysis], opposing: &[PrecedentAnalysis]) -> f64 {
    let support: f64 = supporting.iter().map(|p| p.relevance_score).sum();
    let oppose: f64 = opposing.iter().map(|p| p.relevance_score).sum();
    let total = support + oppose;
    if total == 0.0 {
        0.5
    } else {
        support / total
    }
}

#[async_trait]
impl DimensionAnalyzer for WhyAnalyzer {
    fn dimension(&self) -> Dimension {
        Dimension::Why
    }

    async fn analyze(&self, tenant_id: &str, case_id: &str) -> ContextResult<DimensionData> {
        debug!(case_id, "analyzing WHY dimension");

        let query = GraphQuery::case_scoped(
            tenant_id,
            case_id,
            format!("Find relevant precedent cases for case {case_id}"),
            SearchMode::Global,
        )
        .with_entity_filter(vec![PRECEDENT_ENTITY_TYPE.to_string()]);
        let graph_result = self.graph.query(&query).await?;

        let legal_theories = self.legal_theories(tenant_id, case_id).await;
        let supporting_precedents = categorize_precedents(&graph_result, Favorability::Supporting);
        let opposing_precedents = categorize_precedents(&graph_result, Favorability::Opposing);
        let argument_strength = argument_strength(&supporting_precedents, &opposing_precedents);
        let case_name = case_display_name(self.store.as_ref(), tenant_id, case_id).await;

        info!(
            case_id,
            supporting = supporting_precedents.len(),
            opposing = opposing_precedents.len(),
            "WHY analysis complete"
        );

        Ok(DimensionData::Why(WhyContext {
            case_id: case_id.to_string(),
            case_name,
            legal_theories,
            argument_outline: Vec::new(),
            supporting_precedents,
            opposing_precedents,
            distinguishing_factors: Vec::new(),
            argument_strength,
            risk_factors: Vec::new(),
            mitigation_strategies: Vec::new(),
            similar_case_outcomes: HashMap::new(),
            judge_ruling_patterns: HashMap::new(),
        }))
    }
}

// ============================================================================
// TESTS
// ============================================================================
