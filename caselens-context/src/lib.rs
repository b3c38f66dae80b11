//! CASELENS Context - Dimension Analysis and Aggregation
//!
//! Builds the WHO/WHAT/WHERE/WHEN/WHY context for a case by fanning out
//! to per-dimension analyzers over two external collaborators (a
//! graph-query service and a relational store), scoring the composite,
//! and coordinating with the tiered cache in `caselens-cache`.

pub mod analyzer;
pub mod builder;
pub mod clients;
pub mod scoring;

pub use analyzer::{
    AnalyzerSet, DimensionAnalyzer, WhatAnalyzer, WhenAnalyzer, WhereAnalyzer, WhoAnalyzer,
    WhyAnalyzer,
};
pub use builder::{ContextBuilder, ContextRequest};
pub use clients::{
    GraphCommunity, GraphEntity, GraphQuery, GraphQueryClient, GraphQueryResult,
    GraphRelationship, GraphStatsSnapshot, HealthStatus, Predicate, RelationalStore, Row,
    RowQuery,
};
pub use scoring::{
    composite_score, dimension_score, quality_metrics, resolve_case_name, ScoringConfig,
};
