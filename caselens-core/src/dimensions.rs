//! WHO/WHAT/WHERE/WHEN/WHY context dimension models
//!
//! Each dimension of case context has its own model plus supporting
//! entities. All models carry `case_id` so every piece of context stays
//! case-scoped, and `case_name` so display-name resolution can scan
//! dimension results without extra lookups.

use crate::enums::Dimension;
use crate::identity::{new_query_id, CaseId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// WHO DIMENSION - Parties, Judges, Attorneys, Witnesses
// ============================================================================

/// A party in a case (plaintiff, defendant, third party, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    /// Legal role: plaintiff, defendant, third_party, intervenor, ...
    pub role: String,
    /// person, corporation, government_entity
    pub entity_type: String,
    pub case_id: CaseId,
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
}

/// A judge assigned to a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judge {
    pub id: String,
    pub name: String,
    pub court: String,
    pub case_id: CaseId,
    pub assignment_date: Option<Timestamp>,
    /// Historical case counts with each party
    #[serde(default)]
    pub history_with_parties: HashMap<String, i64>,
}

/// An attorney appearing in a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attorney {
    pub id: String,
    pub name: String,
    pub firm: Option<String>,
    pub bar_number: Option<String>,
    /// Party ids this attorney represents
    #[serde(default)]
    pub representing: Vec<String>,
    pub case_id: CaseId,
}

/// A witness in a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    pub id: String,
    pub name: String,
    /// expert, fact, character
    pub witness_type: String,
    pub representing_party: Option<String>,
    pub case_id: CaseId,
    pub expertise: Option<String>,
}

/// Complete WHO dimension context for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhoContext {
    pub case_id: CaseId,
    pub case_name: String,
    #[serde(default)]
    pub parties: Vec<Party>,
    #[serde(default)]
    pub judges: Vec<Judge>,
    #[serde(default)]
    pub attorneys: Vec<Attorney>,
    #[serde(default)]
    pub witnesses: Vec<Witness>,
    /// source node id → related node ids
    #[serde(default)]
    pub party_relationships: HashMap<String, Vec<String>>,
    /// party id → attorney id
    #[serde(default)]
    pub representation_map: HashMap<String, String>,
}

impl WhoContext {
    /// Empty WHO context carrying only case identity.
    pub fn empty(case_id: impl Into<CaseId>, case_name: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            case_name: case_name.into(),
            parties: Vec::new(),
            judges: Vec::new(),
            attorneys: Vec::new(),
            witnesses: Vec::new(),
            party_relationships: HashMap::new(),
            representation_map: HashMap::new(),
        }
    }

    pub fn party_count(&self) -> usize {
        self.parties.len()
    }

    /// All parties with the given role (case-insensitive).
    pub fn parties_by_role(&self, role: &str) -> Vec<&Party> {
        let role = role.to_lowercase();
        self.parties
            .iter()
            .filter(|p| p.role.to_lowercase() == role)
            .collect()
    }

    pub fn data_points(&self) -> usize {
        self.parties.len() + self.judges.len() + self.attorneys.len() + self.witnesses.len()
    }
}

// ============================================================================
// WHAT DIMENSION - Legal Issues, Claims, Citations
// ============================================================================

/// Kind of a legal citation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationKind {
    Statute,
    CaseLaw,
    Regulation,
}

/// A legal citation (statute, case law, or regulation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub text: String,
    pub kind: CitationKind,
    pub jurisdiction: String,
    /// Extraction confidence (0.0-1.0)
    pub confidence: f64,
    pub case_id: Option<CaseId>,
}

/// A cause of action asserted in a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauseOfAction {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Legal elements to prove
    #[serde(default)]
    pub elements: Vec<String>,
    pub case_id: CaseId,
}

/// Complete WHAT dimension context for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatContext {
    pub case_id: CaseId,
    pub case_name: String,
    #[serde(default)]
    pub causes_of_action: Vec<CauseOfAction>,
    #[serde(default)]
    pub legal_issues: Vec<String>,
    #[serde(default)]
    pub doctrines: Vec<String>,
    #[serde(default)]
    pub statutes: Vec<Citation>,
    #[serde(default)]
    pub case_citations: Vec<Citation>,
    pub primary_legal_theory: Option<String>,
    /// Heuristic complexity estimate (0.0-1.0)
    pub issue_complexity: f64,
    /// federal, state, mixed
    pub jurisdiction_type: String,
}

impl WhatContext {
    pub fn empty(case_id: impl Into<CaseId>, case_name: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            case_name: case_name.into(),
            causes_of_action: Vec::new(),
            legal_issues: Vec::new(),
            doctrines: Vec::new(),
            statutes: Vec::new(),
            case_citations: Vec::new(),
            primary_legal_theory: None,
            issue_complexity: 0.0,
            jurisdiction_type: "federal".to_string(),
        }
    }

    pub fn statute_count(&self) -> usize {
        self.statutes.len()
    }

    pub fn case_citation_count(&self) -> usize {
        self.case_citations.len()
    }

    pub fn data_points(&self) -> usize {
        self.causes_of_action.len()
            + self.legal_issues.len()
            + self.statutes.len()
            + self.case_citations.len()
    }
}

// ============================================================================
// WHERE DIMENSION - Jurisdiction, Venue, Court
// ============================================================================

/// A local court rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRule {
    pub rule_number: String,
    pub description: String,
    pub jurisdiction: String,
}

/// Complete WHERE dimension context for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereContext {
    pub case_id: CaseId,
    pub case_name: String,
    pub primary_jurisdiction: String,
    pub court: String,
    pub venue: String,
    pub judge_chambers: Option<String>,
    #[serde(default)]
    pub local_rules: Vec<LocalRule>,
    #[serde(default)]
    pub filing_requirements: Vec<String>,
    #[serde(default)]
    pub related_proceedings: Vec<Value>,
}

impl WhereContext {
    pub fn empty(case_id: impl Into<CaseId>, case_name: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            case_name: case_name.into(),
            primary_jurisdiction: String::new(),
            court: String::new(),
            venue: String::new(),
            judge_chambers: None,
            local_rules: Vec::new(),
            filing_requirements: Vec::new(),
            related_proceedings: Vec::new(),
        }
    }

    /// Complete court name with jurisdiction.
    pub fn full_court_name(&self) -> String {
        format!("{}, {}", self.court, self.primary_jurisdiction)
    }

    /// Whether all three core location fields are populated.
    pub fn has_core_location(&self) -> bool {
        !self.primary_jurisdiction.is_empty() && !self.court.is_empty() && !self.venue.is_empty()
    }

    pub fn data_points(&self) -> usize {
        if self.has_core_location() {
            3
        } else {
            0
        }
    }
}

// ============================================================================
// WHEN DIMENSION - Timeline, Deadlines, Case Age
// ============================================================================

/// An event in the case timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: Timestamp,
    /// filing, hearing, motion, order
    pub event_type: String,
    pub description: String,
    pub case_id: CaseId,
}

/// Priority of a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeadlinePriority {
    High,
    #[default]
    Medium,
    Low,
}

/// A case deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    pub deadline_date: Timestamp,
    /// discovery, motion, trial
    pub deadline_type: String,
    pub description: String,
    pub case_id: CaseId,
    #[serde(default)]
    pub is_met: bool,
    #[serde(default)]
    pub priority: DeadlinePriority,
}

/// Complete WHEN dimension context for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenContext {
    pub case_id: CaseId,
    pub case_name: String,
    pub filing_date: Option<Timestamp>,
    pub incident_date: Option<Timestamp>,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default)]
    pub upcoming_deadlines: Vec<Deadline>,
    #[serde(default)]
    pub past_deadlines: Vec<Deadline>,
    pub discovery_cutoff: Option<Timestamp>,
    pub motion_deadline: Option<Timestamp>,
    pub trial_date: Option<Timestamp>,
    pub statute_of_limitations: Option<Timestamp>,
    pub days_until_next_deadline: Option<i64>,
    /// Heuristic urgency estimate (0.0-1.0)
    pub urgency_score: f64,
    pub case_age_days: i64,
}

impl WhenContext {
    pub fn empty(case_id: impl Into<CaseId>, case_name: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            case_name: case_name.into(),
            filing_date: None,
            incident_date: None,
            timeline: Vec::new(),
            upcoming_deadlines: Vec::new(),
            past_deadlines: Vec::new(),
            discovery_cutoff: None,
            motion_deadline: None,
            trial_date: None,
            statute_of_limitations: None,
            days_until_next_deadline: None,
            urgency_score: 0.0,
            case_age_days: 0,
        }
    }

    /// Case age in days from the filing date, saturating at zero.
    pub fn calculate_case_age(&self) -> i64 {
        match self.filing_date {
            Some(filed) => Utc::now().signed_duration_since(filed).num_days().max(0),
            None => 0,
        }
    }

    /// The next upcoming deadline, if any.
    pub fn next_deadline(&self) -> Option<&Deadline> {
        self.upcoming_deadlines
            .iter()
            .min_by_key(|d| d.deadline_date)
    }

    pub fn data_points(&self) -> usize {
        self.timeline.len() + self.upcoming_deadlines.len() + self.past_deadlines.len()
    }
}

// ============================================================================
// WHY DIMENSION - Legal Reasoning, Precedents, Arguments
// ============================================================================

/// Whether a precedent helps or hurts the case at hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Favorability {
    Supporting,
    Opposing,
    #[default]
    Neutral,
}

/// Analysis of a legal precedent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecedentAnalysis {
    pub case_name: String,
    pub citation: String,
    /// Relevance to the current case (0.0-1.0)
    pub relevance_score: f64,
    pub holding: String,
    #[serde(default)]
    pub distinguishing_factors: Vec<String>,
    #[serde(default)]
    pub favorability: Favorability,
}

/// A legal theory advanced for the case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalTheory {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Theory strength (0.0-1.0)
    pub strength: f64,
    #[serde(default)]
    pub supporting_precedents: Vec<String>,
    pub case_id: CaseId,
}

/// Complete WHY dimension context for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhyContext {
    pub case_id: CaseId,
    pub case_name: String,
    #[serde(default)]
    pub legal_theories: Vec<LegalTheory>,
    #[serde(default)]
    pub argument_outline: Vec<Value>,
    #[serde(default)]
    pub supporting_precedents: Vec<PrecedentAnalysis>,
    #[serde(default)]
    pub opposing_precedents: Vec<PrecedentAnalysis>,
    #[serde(default)]
    pub distinguishing_factors: Vec<String>,
    /// Relative strength of the supporting side (0.0-1.0)
    pub argument_strength: f64,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub mitigation_strategies: Vec<String>,
    #[serde(default)]
    pub similar_case_outcomes: HashMap<String, f64>,
    #[serde(default)]
    pub judge_ruling_patterns: HashMap<String, f64>,
}

impl WhyContext {
    pub fn empty(case_id: impl Into<CaseId>, case_name: impl Into<String>) -> Self {
        Self {
            case_id: case_id.into(),
            case_name: case_name.into(),
            legal_theories: Vec::new(),
            argument_outline: Vec::new(),
            supporting_precedents: Vec::new(),
            opposing_precedents: Vec::new(),
            distinguishing_factors: Vec::new(),
            argument_strength: 0.5,
            risk_factors: Vec::new(),
            mitigation_strategies: Vec::new(),
            similar_case_outcomes: HashMap::new(),
            judge_ruling_patterns: HashMap::new(),
        }
    }

    pub fn supporting_precedent_count(&self) -> usize {
        self.supporting_precedents.len()
    }

    /// Average relevance score across all precedents, 0.0 when none.
    pub fn average_relevance(&self) -> f64 {
        let all: Vec<&PrecedentAnalysis> = self
            .supporting_precedents
            .iter()
            .chain(self.opposing_precedents.iter())
            .collect();
        if all.is_empty() {
            return 0.0;
        }
        all.iter().map(|p| p.relevance_score).sum::<f64>() / all.len() as f64
    }

    pub fn data_points(&self) -> usize {
        self.legal_theories.len()
            + self.supporting_precedents.len()
            + self.opposing_precedents.len()
    }
}

// ============================================================================
// TAGGED DIMENSION DATA
// ============================================================================

/// One resolved dimension result.
///
/// The closed tag set means analyzer dispatch and result routing are
/// checked by the compiler instead of string matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dimension", rename_all = "UPPERCASE")]
pub enum DimensionData {
    Who(WhoContext),
    What(WhatContext),
    Where(WhereContext),
    When(WhenContext),
    Why(WhyContext),
}

impl DimensionData {
    pub fn dimension(&self) -> Dimension {
        match self {
            DimensionData::Who(_) => Dimension::Who,
            DimensionData::What(_) => Dimension::What,
            DimensionData::Where(_) => Dimension::Where,
            DimensionData::When(_) => Dimension::When,
            DimensionData::Why(_) => Dimension::Why,
        }
    }

    pub fn case_id(&self) -> &str {
        match self {
            DimensionData::Who(c) => &c.case_id,
            DimensionData::What(c) => &c.case_id,
            DimensionData::Where(c) => &c.case_id,
            DimensionData::When(c) => &c.case_id,
            DimensionData::Why(c) => &c.case_id,
        }
    }

    pub fn case_name(&self) -> &str {
        match self {
            DimensionData::Who(c) => &c.case_name,
            DimensionData::What(c) => &c.case_name,
            DimensionData::Where(c) => &c.case_name,
            DimensionData::When(c) => &c.case_name,
            DimensionData::Why(c) => &c.case_name,
        }
    }

    /// Number of extracted data points, counted the way each dimension
    /// defines them.
    pub fn data_points(&self) -> usize {
        match self {
            DimensionData::Who(c) => c.data_points(),
            DimensionData::What(c) => c.data_points(),
            DimensionData::Where(c) => c.data_points(),
            DimensionData::When(c) => c.data_points(),
            DimensionData::Why(c) => c.data_points(),
        }
    }
}

// ============================================================================
// COMPOSITE CONTEXT RESPONSE
// ============================================================================

/// Complete multi-dimensional context for a case, with quality metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextResponse {
    pub query_id: Uuid,
    pub case_id: CaseId,
    pub case_name: String,
    pub who: Option<WhoContext>,
    pub what: Option<WhatContext>,
    #[serde(rename = "where")]
    pub where_: Option<WhereContext>,
    pub when: Option<WhenContext>,
    pub why: Option<WhyContext>,
    /// Composite completeness score (0.0-1.0)
    pub context_score: f64,
    pub is_complete: bool,
    /// Whether this response was served from cache
    pub cached: bool,
    pub execution_time_ms: u64,
    pub timestamp: Timestamp,
}

impl ContextResponse {
    /// Empty response shell for a case; dimensions are filled in as
    /// analyzer results arrive.
    pub fn new(case_id: impl Into<CaseId>, case_name: impl Into<String>) -> Self {
        Self {
            query_id: new_query_id(),
            case_id: case_id.into(),
            case_name: case_name.into(),
            who: None,
            what: None,
            where_: None,
            when: None,
            why: None,
            context_score: 0.0,
            is_complete: false,
            cached: false,
            execution_time_ms: 0,
            timestamp: Utc::now(),
        }
    }

    /// Slot a dimension result into its place.
    pub fn insert(&mut self, data: DimensionData) {
        match data {
            DimensionData::Who(c) => self.who = Some(c),
            DimensionData::What(c) => self.what = Some(c),
            DimensionData::Where(c) => self.where_ = Some(c),
            DimensionData::When(c) => self.when = Some(c),
            DimensionData::Why(c) => self.why = Some(c),
        }
    }

    /// Count of populated dimensions.
    pub fn dimension_count(&self) -> usize {
        Dimension::ALL
            .iter()
            .filter(|d| self.dimension_populated(**d))
            .count()
    }

    pub fn dimension_populated(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Who => self.who.is_some(),
            Dimension::What => self.what.is_some(),
            Dimension::Where => self.where_.is_some(),
            Dimension::When => self.when.is_some(),
            Dimension::Why => self.why.is_some(),
        }
    }
}

// ============================================================================
// DIMENSION QUALITY METRICS
// ============================================================================

/// Quality metrics for a single dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionQualityMetrics {
    pub dimension: Dimension,
    /// Completeness score (0.0-1.0)
    pub completeness_score: f64,
    pub data_points: usize,
    /// Average confidence of extracted data (0.0-1.0)
    pub confidence_avg: f64,
    /// Whether the dimension meets the completeness threshold
    pub is_sufficient: bool,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_party(role: &str) -> Party {
        Party {
            id: "p-1".to_string(),
            name: "Acme Corp".to_string(),
            role: role.to_string(),
            entity_type: "corporation".to_string(),
            case_id: "case-1".to_string(),
            metadata: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_who_context_parties_by_role() {
        let mut who = WhoContext::empty("case-1", "Acme v. Widget");
        who.parties.push(make_party("plaintiff"));
        who.parties.push(make_party("Defendant"));

        assert_eq!(who.parties_by_role("PLAINTIFF").len(), 1);
        assert_eq!(who.parties_by_role("defendant").len(), 1);
        assert_eq!(who.parties_by_role("intervenor").len(), 0);
        assert_eq!(who.party_count(), 2);
    }

    #[test]
    fn test_where_context_core_location() {
        let mut where_ = WhereContext::empty("case-1", "Acme v. Widget");
        assert!(!where_.has_core_location());
        assert_eq!(where_.data_points(), 0);

        where_.primary_jurisdiction = "Federal".to_string();
        where_.court = "N.D. Cal.".to_string();
        where_.venue = "San Francisco".to_string();
        assert!(where_.has_core_location());
        assert_eq!(where_.data_points(), 3);
        assert_eq!(where_.full_court_name(), "N.D. Cal., Federal");
    }

    #[test]
    fn test_when_context_next_deadline() {
        let mut when = WhenContext::empty("case-1", "Acme v. Widget");
        assert!(when.next_deadline().is_none());

        let near = Utc::now() + chrono::Duration::days(3);
        let far = Utc::now() + chrono::Duration::days(30);
        for (date, ty) in [(far, "trial"), (near, "discovery")] {
            when.upcoming_deadlines.push(Deadline {
                deadline_date: date,
                deadline_type: ty.to_string(),
                description: String::new(),
                case_id: "case-1".to_string(),
                is_met: false,
                priority: DeadlinePriority::default(),
            });
        }
        assert_eq!(when.next_deadline().unwrap().deadline_type, "discovery");
    }

    #[test]
    fn test_why_context_average_relevance() {
        let mut why = WhyContext::empty("case-1", "Acme v. Widget");
        assert_eq!(why.average_relevance(), 0.0);

        why.supporting_precedents.push(PrecedentAnalysis {
            case_name: "Smith v. Jones".to_string(),
            citation: "123 F.3d 456".to_string(),
            relevance_score: 0.8,
            holding: String::new(),
            distinguishing_factors: Vec::new(),
            favorability: Favorability::Supporting,
        });
        why.opposing_precedents.push(PrecedentAnalysis {
            case_name: "Doe v. Roe".to_string(),
            citation: "789 F.3d 12".to_string(),
            relevance_score: 0.4,
            holding: String::new(),
            distinguishing_factors: Vec::new(),
            favorability: Favorability::Opposing,
        });
        assert!((why.average_relevance() - 0.6).abs() < 1e-9);
        assert_eq!(why.data_points(), 2);
    }

    #[test]
    fn test_dimension_data_accessors() {
        let who = WhoContext::empty("case-9", "In re Widget");
        let data = DimensionData::Who(who);
        assert_eq!(data.dimension(), Dimension::Who);
        assert_eq!(data.case_id(), "case-9");
        assert_eq!(data.case_name(), "In re Widget");
        assert_eq!(data.data_points(), 0);
    }

    #[test]
    fn test_context_response_insert_and_count() {
        let mut response = ContextResponse::new("case-1", "Case case-1");
        assert_eq!(response.dimension_count(), 0);

        response.insert(DimensionData::Who(WhoContext::empty("case-1", "x")));
        response.insert(DimensionData::When(WhenContext::empty("case-1", "x")));

        assert_eq!(response.dimension_count(), 2);
        assert!(response.dimension_populated(Dimension::Who));
        assert!(response.dimension_populated(Dimension::When));
        assert!(!response.dimension_populated(Dimension::Why));
    }

    #[test]
    fn test_context_response_serde_roundtrip() {
        let mut response = ContextResponse::new("case-1", "Acme v. Widget");
        response.insert(DimensionData::Where(WhereContext::empty("case-1", "x")));
        response.context_score = 0.42;

        let json = serde_json::to_value(&response).expect("serialize");
        // `where` is a Rust keyword; the serialized field must not carry
        // the underscore suffix.
        assert!(json.get("where").is_some());
        assert!(json.get("where_").is_none());

        let back: ContextResponse = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, response);
    }
}
