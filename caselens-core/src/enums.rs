//! Enum types for CASELENS entities

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CORE ENUMS
// ============================================================================

/// One facet of case context, resolved by its own analyzer.
///
/// The set is closed: unknown dimension names are a parse error, never a
/// runtime string-dispatch miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    /// Parties, judges, attorneys, witnesses
    Who,
    /// Legal issues, claims, citations, causes of action
    What,
    /// Jurisdiction, venue, court information
    Where,
    /// Timeline, deadlines, case age, urgency
    When,
    /// Legal reasoning, precedents, argument analysis
    Why,
}

impl Dimension {
    /// All dimensions in canonical order. Fan-out, scoring, and display-name
    /// resolution all iterate in this order.
    pub const ALL: [Dimension; 5] = [
        Dimension::Who,
        Dimension::What,
        Dimension::Where,
        Dimension::When,
        Dimension::Why,
    ];

    /// Wire/database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Who => "WHO",
            Dimension::What => "WHAT",
            Dimension::Where => "WHERE",
            Dimension::When => "WHEN",
            Dimension::Why => "WHY",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WHO" => Ok(Dimension::Who),
            "WHAT" => Ok(Dimension::What),
            "WHERE" => Ok(Dimension::Where),
            "WHEN" => Ok(Dimension::When),
            "WHY" => Ok(Dimension::Why),
            _ => Err(ValidationError::UnknownDimension {
                name: s.to_string(),
            }),
        }
    }
}

/// Named preset selecting a subset of dimensions.
///
/// The presets form a strict superset chain:
/// `minimal ⊂ standard ⊂ comprehensive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ContextScope {
    /// Basic parties and jurisdiction
    Minimal,
    /// Adds legal issues and timeline
    Standard,
    /// Full five-dimension context
    #[default]
    Comprehensive,
}

impl ContextScope {
    /// All scopes, used to enumerate keys when invalidating a whole case.
    pub const ALL: [ContextScope; 3] = [
        ContextScope::Minimal,
        ContextScope::Standard,
        ContextScope::Comprehensive,
    ];

    /// The fixed, ordered dimension subset this scope selects.
    pub fn dimensions(&self) -> &'static [Dimension] {
        match self {
            ContextScope::Minimal => &[Dimension::Who, Dimension::Where],
            ContextScope::Standard => &[
                Dimension::Who,
                Dimension::What,
                Dimension::Where,
                Dimension::When,
            ],
            ContextScope::Comprehensive => &Dimension::ALL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextScope::Minimal => "minimal",
            ContextScope::Standard => "standard",
            ContextScope::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for ContextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextScope {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minimal" => Ok(ContextScope::Minimal),
            "standard" => Ok(ContextScope::Standard),
            "comprehensive" => Ok(ContextScope::Comprehensive),
            _ => Err(ValidationError::UnknownScope {
                name: s.to_string(),
            }),
        }
    }
}

/// Lifecycle status of a case. Selects the TTL for the slower cache tiers:
/// active cases still churn, closed cases are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CaseStatus {
    #[default]
    Active,
    Closed,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Active => "active",
            CaseStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(CaseStatus::Active),
            "closed" => Ok(CaseStatus::Closed),
            _ => Err(ValidationError::MissingField {
                field: format!("case_status (got {s:?})"),
            }),
        }
    }
}

/// Search mode for graph-query collaborator calls.
///
/// `Local` searches are case-scoped and must carry a case id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMode {
    Local,
    Global,
    Hybrid,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Local => "LOCAL",
            SearchMode::Global => "GLOBAL",
            SearchMode::Hybrid => "HYBRID",
        }
    }

    /// Whether queries in this mode are scoped to a single case.
    pub fn is_case_scoped(&self) -> bool {
        matches!(self, SearchMode::Local)
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TESTS
// ============================================================================
