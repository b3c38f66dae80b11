//! CASELENS Core - Entity Types
//!
//! Pure data structures for the context engine. All other crates depend
//! on this. This crate contains ONLY data types - no business logic.

pub mod dimensions;
pub mod enums;
pub mod error;
pub mod identity;

pub use dimensions::{
    Attorney, CauseOfAction, Citation, CitationKind, ContextResponse, Deadline, DeadlinePriority,
    DimensionData, DimensionQualityMetrics, Favorability, Judge, LegalTheory, LocalRule, Party,
    PrecedentAnalysis, TimelineEvent, WhatContext, WhenContext, WhereContext, WhoContext,
    WhyContext, Witness,
};
pub use enums::{CaseStatus, ContextScope, Dimension, SearchMode};
pub use error::{
    CacheError, CollaboratorError, ContextError, ContextResult, ValidationError,
};
pub use identity::{new_query_id, CaseId, TenantId, Timestamp};
