//! Context builder: concurrent dimension aggregation with caching.
//!
//! The builder is the main entry point for assembling case context. For
//! each request it selects the dimension set, consults the tiered cache,
//! fans out to every selected analyzer concurrently, tolerates individual
//! analyzer failures, scores the composite, and writes complete results
//! back through the cache.
//!
//! Construct one builder at process start and share it across requests;
//! analyzers and cache handles are read-mostly and request state lives on
//! the stack of each `build_context` call. Dropping the future returned
//! by `build_context` abandons any in-flight analyzer calls.

use crate::analyzer::AnalyzerSet;
use crate::clients::{GraphQueryClient, RelationalStore};
use crate::scoring::{composite_score, quality_metrics, resolve_case_name, ScoringConfig};
use caselens_cache::TieredCacheManager;
use caselens_core::{
    CaseStatus, ContextResponse, ContextResult, ContextScope, Dimension, DimensionData,
    DimensionQualityMetrics, ValidationError,
};
use futures_util::future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

// ============================================================================
// REQUEST
// ============================================================================

/// A context-construction request.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextRequest {
    pub tenant_id: String,
    pub case_id: String,
    pub scope: ContextScope,
    /// Explicit dimension list; when non-empty it overrides the scope.
    pub dimensions: Option<Vec<Dimension>>,
    /// Whether to consult and populate the composite cache.
    pub use_cache: bool,
    /// Case status used to pick the slower-tier TTL on write-through.
    pub case_status: CaseStatus,
}

impl ContextRequest {
    pub fn new(tenant_id: &str, case_id: &str) -> Self {
        Self {
            tenant_id: tenant_id.to_string(),
            case_id: case_id.to_string(),
            scope: ContextScope::Comprehensive,
            dimensions: None,
            use_cache: true,
            case_status: CaseStatus::Active,
        }
    }

    pub fn with_scope(mut self, scope: ContextScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_dimensions(mut self, dimensions: Vec<Dimension>) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Skip the cache pre-check; used by refresh-style operations that
    /// must observe live data.
    pub fn bypass_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn with_case_status(mut self, case_status: CaseStatus) -> Self {
        self.case_status = case_status;
        self
    }

    fn validate(&self) -> ContextResult<()> {
        if self.tenant_id.is_empty() {
            return Err(ValidationError::MissingField {
                field: "tenant_id".to_string(),
            }
            .into());
        }
        if self.case_id.is_empty() {
            return Err(ValidationError::MissingField {
                field: "case_id".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// ============================================================================
// CONTEXT BUILDER
// ============================================================================

/// Orchestrates the five dimension analyzers and the tiered cache.
pub struct ContextBuilder {
    analyzers: AnalyzerSet,
    cache: Arc<TieredCacheManager>,
    scoring: ScoringConfig,
}

impl ContextBuilder {
    pub fn new(analyzers: AnalyzerSet, cache: Arc<TieredCacheManager>) -> Self {
        Self {
            analyzers,
            cache,
            scoring: ScoringConfig::default(),
        }
    }

    /// Wire the standard analyzers directly from collaborator handles.
    pub fn from_clients(
        graph: Arc<dyn GraphQueryClient>,
        store: Arc<dyn RelationalStore>,
        cache: Arc<TieredCacheManager>,
    ) -> Self {
        Self::new(AnalyzerSet::new(graph, store), cache)
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn cache_manager(&self) -> &TieredCacheManager {
        &self.cache
    }

    /// Build the multi-dimensional context for a case.
    ///
    /// Fails fast on invalid input; collaborator failures degrade to
    /// absent dimensions and cache failures degrade to misses, so a
    /// well-formed request always produces a response.
    pub async fn build_context(&self, request: &ContextRequest) -> ContextResult<ContextResponse> {
        let started = Instant::now();
        request.validate()?;
        let dimensions = self.select_dimensions(request)?;

        info!(
            tenant_id = %request.tenant_id,
            case_id = %request.case_id,
            scope = %request.scope,
            "building context"
        );

        if request.use_cache {
            if let Some(cached) = self.check_cache(request).await {
                info!(case_id = %request.case_id, "returning cached context");
                return Ok(cached);
            }
        }

        let results = self
            .fan_out(&dimensions, &request.tenant_id, &request.case_id)
            .await;

        let context_score = composite_score(&results, &self.scoring);
        let is_complete = context_score >= self.scoring.completeness_threshold;
        let case_name = resolve_case_name(&results, &request.case_id);

        let mut response = ContextResponse::new(request.case_id.clone(), case_name);
        for data in results.into_iter().flatten() {
            response.insert(data);
        }
        response.context_score = context_score;
        response.is_complete = is_complete;
        response.execution_time_ms = started.elapsed().as_millis() as u64;

        if is_complete && request.use_cache {
            self.store_in_cache(request, &response).await;
        }

        info!(
            case_id = %request.case_id,
            score = context_score,
            elapsed_ms = response.execution_time_ms,
            complete = is_complete,
            "context building complete"
        );

        Ok(response)
    }

    /// Re-run exactly one analyzer, bypassing the composite cache, and
    /// return its raw result. Analyzer failures propagate: a caller
    /// refreshing one dimension wants to see the failure.
    pub async fn refresh_dimension(
        &self,
        tenant_id: &str,
        case_id: &str,
        dimension: Dimension,
    ) -> ContextResult<DimensionData> {
        info!(case_id, %dimension, "refreshing dimension");
        self.analyzers
            .analyzer(dimension)
            .analyze(tenant_id, case_id)
            .await
    }

    /// Quality metrics for one dimension, computed from a fresh analyzer
    /// run.
    pub async fn dimension_quality(
        &self,
        tenant_id: &str,
        case_id: &str,
        dimension: Dimension,
    ) -> ContextResult<DimensionQualityMetrics> {
        let data = self
            .analyzers
            .analyzer(dimension)
            .analyze(tenant_id, case_id)
            .await?;
        Ok(quality_metrics(&data, &self.scoring))
    }

    /// The dimension set for a request: an explicit non-empty list is
    /// used verbatim, otherwise the scope's fixed subset.
    fn select_dimensions(&self, request: &ContextRequest) -> ContextResult<Vec<Dimension>> {
        match &request.dimensions {
            Some(dimensions) if !dimensions.is_empty() => Ok(dimensions.clone()),
            _ => Ok(request.scope.dimensions().to_vec()),
        }
    }

    /// Launch every selected analyzer, then join all of them. Results come
    /// back positionally in the order the fan-out was issued; a failed
    /// analyzer yields an absent slot and never disturbs its siblings.
    async fn fan_out(
        &self,
        dimensions: &[Dimension],
        tenant_id: &str,
        case_id: &str,
    ) -> Vec<Option<DimensionData>> {
        debug!(
            case_id,
            dimensions = ?dimensions,
            "fanning out dimension analyzers"
        );

        let tasks = dimensions.iter().map(|dimension| {
            let analyzer = self.analyzers.analyzer(*dimension);
            let dimension = *dimension;
            async move {
                match analyzer.analyze(tenant_id, case_id).await {
                    Ok(data) => Some(data),
                    Err(err) => {
                        error!(case_id, %dimension, error = %err, "dimension analyzer failed");
                        None
                    }
                }
            }
        });

        future::join_all(tasks).await
    }

    /// Cache pre-check. Any cache failure, including a blob that no
    /// longer deserializes, is treated as a miss.
    async fn check_cache(&self, request: &ContextRequest) -> Option<ContextResponse> {
        let value = self
            .cache
            .get(&request.tenant_id, &request.case_id, request.scope, None)
            .await?;

        match serde_json::from_value::<ContextResponse>(value) {
            Ok(mut response) => {
                response.cached = true;
                Some(response)
            }
            Err(err) => {
                warn!(
                    case_id = %request.case_id,
                    error = %err,
                    "cached context failed to deserialize; treating as miss"
                );
                None
            }
        }
    }

    /// Write-through after a complete build. Failures are logged and
    /// swallowed; caching is never load-bearing.
    async fn store_in_cache(&self, request: &ContextRequest, response: &ContextResponse) {
        match serde_json::to_value(response) {
            Ok(value) => {
                self.cache
                    .set(
                        &request.tenant_id,
                        &request.case_id,
                        request.scope,
                        value,
                        request.case_status,
                        None,
                    )
                    .await;
            }
            Err(err) => {
                warn!(case_id = %request.case_id, error = %err, "context cache write failed");
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
