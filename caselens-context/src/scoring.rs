//! Quality scoring for dimension results and composite contexts.
//!
//! Each dimension scores in [0, 1] by counting extracted data points and
//! normalizing against a target count, saturating once the target is met.
//! The composite score averages the per-dimension scores over everything
//! that was requested (absent dimensions score zero) and then applies a
//! completeness penalty, so both thin dimensions and outright-missing
//! ones drag the result down.

use caselens_core::{Dimension, DimensionData, DimensionQualityMetrics};

/// Confidence reported for quality metrics when the underlying data
/// carries no per-item confidence of its own.
const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Scoring knobs.
///
/// The data-point target is a heuristic, not a derived invariant: "this
/// many items means a fully fleshed-out dimension". Keep it configurable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Data points at which a counting dimension reaches full score.
    pub data_point_target: u32,
    /// Composite score at or above which a context is complete.
    pub completeness_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            data_point_target: 10,
            completeness_threshold: 0.85,
        }
    }
}

impl ScoringConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_point_target(mut self, target: u32) -> Self {
        self.data_point_target = target;
        self
    }

    pub fn with_completeness_threshold(mut self, threshold: f64) -> Self {
        self.completeness_threshold = threshold;
        self
    }
}

/// Score one dimension result in [0, 1].
///
/// WHO/WHAT/WHY saturate at the data-point target. WHERE scores the
/// fraction of its three core location fields that are populated. WHEN
/// adds a filing-date bonus on top of its count score, clamped so the
/// result stays in range.
pub fn dimension_score(data: &DimensionData, config: &ScoringConfig) -> f64 {
    let target = config.data_point_target.max(1) as f64;
    match data {
        DimensionData::Who(c) => (c.data_points() as f64 / target).min(1.0),
        DimensionData::What(c) => (c.data_points() as f64 / target).min(1.0),
        DimensionData::Why(c) => (c.data_points() as f64 / target).min(1.0),
        DimensionData::Where(c) => {
            let present = [&c.primary_jurisdiction, &c.court, &c.venue]
                .iter()
                .filter(|field| !field.is_empty())
                .count();
            present as f64 / 3.0
        }
        DimensionData::When(c) => {
            let count_score = (c.data_points() as f64 / target).min(1.0);
            let filing_bonus = if c.filing_date.is_some() { 0.3 } else { 0.0 };
            (count_score + filing_bonus).clamp(0.0, 1.0)
        }
    }
}

/// Composite score over the requested dimensions.
///
/// `(mean of per-dimension scores, absent as zero) x (successful /
/// requested)`, clamped to [0, 1]. Zero requested dimensions score zero.
pub fn composite_score(results: &[Option<DimensionData>], config: &ScoringConfig) -> f64 {
    if results.is_empty() {
        return 0.0;
    }

    let successful = results.iter().filter(|r| r.is_some()).count();
    let score_sum: f64 = results
        .iter()
        .map(|r| r.as_ref().map_or(0.0, |data| dimension_score(data, config)))
        .sum();

    let avg = score_sum / results.len() as f64;
    let completeness_ratio = successful as f64 / results.len() as f64;
    (avg * completeness_ratio).clamp(0.0, 1.0)
}

/// Independently computed quality metrics for one dimension.
pub fn quality_metrics(data: &DimensionData, config: &ScoringConfig) -> DimensionQualityMetrics {
    let completeness_score = dimension_score(data, config);
    DimensionQualityMetrics {
        dimension: data.dimension(),
        completeness_score,
        data_points: data.data_points(),
        confidence_avg: DEFAULT_CONFIDENCE,
        is_sufficient: completeness_score >= config.completeness_threshold,
    }
}

/// First non-placeholder display name among the results, scanned in the
/// order the dimensions were requested; otherwise a formatted case id.
pub fn resolve_case_name(results: &[Option<DimensionData>], case_id: &str) -> String {
    let placeholder = format!("Case {case_id}");
    results
        .iter()
        .flatten()
        .map(DimensionData::case_name)
        .find(|name| !name.is_empty() && **name != placeholder)
        .map(str::to_string)
        .unwrap_or(placeholder)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caselens_core::{
        Party, WhatContext, WhenContext, WhereContext, WhoContext, WhyContext,
    };
    use chrono::Utc;

    fn who_with_parties(count: usize) -> DimensionData {
        let mut who = WhoContext::empty("case-1", "Case case-1");
        for i in 0..count {
            who.parties.push(Party {
                id: format!("p-{i}"),
                name: format!("Party {i}"),
                role: "plaintiff".to_string(),
                entity_type: "person".to_string(),
                case_id: "case-1".to_string(),
                metadata: serde_json::Map::new(),
            });
        }
        DimensionData::Who(who)
    }

    fn full_where() -> DimensionData {
        let mut where_ = WhereContext::empty("case-1", "Case case-1");
        where_.primary_jurisdiction = "Federal".to_string();
        where_.court = "N.D. Cal.".to_string();
        where_.venue = "San Francisco".to_string();
        DimensionData::Where(where_)
    }

    #[test]
    fn test_counting_dimension_scales_linearly() {
        let config = ScoringConfig::default();
        assert_eq!(dimension_score(&who_with_parties(0), &config), 0.0);
        assert!((dimension_score(&who_with_parties(5), &config) - 0.5).abs() < 1e-9);
        assert_eq!(dimension_score(&who_with_parties(10), &config), 1.0);
    }

    #[test]
    fn test_score_saturates_at_target() {
        let config = ScoringConfig::default();
        assert_eq!(dimension_score(&who_with_parties(50), &config), 1.0);
    }

    #[test]
    fn test_target_is_configurable() {
        let config = ScoringConfig::default().with_data_point_target(5);
        assert_eq!(dimension_score(&who_with_parties(5), &config), 1.0);
    }

    #[test]
    fn test_where_scores_presence_fraction() {
        let config = ScoringConfig::default();
        assert_eq!(dimension_score(&full_where(), &config), 1.0);

        let mut partial = WhereContext::empty("case-1", "x");
        partial.primary_jurisdiction = "Federal".to_string();
        assert!(
            (dimension_score(&DimensionData::Where(partial), &config) - 1.0 / 3.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_when_filing_bonus_is_clamped() {
        let config = ScoringConfig::default();
        let mut when = WhenContext::empty("case-1", "x");
        when.filing_date = Some(Utc::now());
        // Bonus alone.
        assert!((dimension_score(&DimensionData::When(when.clone()), &config) - 0.3).abs() < 1e-9);

        // Saturated count plus the bonus must still not exceed 1.0.
        for i in 0..20 {
            when.timeline.push(caselens_core::TimelineEvent {
                date: Utc::now(),
                event_type: "filing".to_string(),
                description: format!("event {i}"),
                case_id: "case-1".to_string(),
            });
        }
        assert_eq!(dimension_score(&DimensionData::When(when), &config), 1.0);
    }

    #[test]
    fn test_composite_empty_request_scores_zero() {
        assert_eq!(composite_score(&[], &ScoringConfig::default()), 0.0);
    }

    #[test]
    fn test_composite_penalizes_missing_dimension() {
        let config = ScoringConfig::default();
        let full = vec![
            Some(who_with_parties(10)),
            Some(full_where()),
        ];
        let with_missing = vec![Some(who_with_parties(10)), None];

        let full_score = composite_score(&full, &config);
        let degraded = composite_score(&with_missing, &config);
        assert_eq!(full_score, 1.0);
        // Mean drops to 0.5 and the completeness ratio halves it again.
        assert!((degraded - 0.25).abs() < 1e-9);
        assert!(degraded < full_score);
    }

    #[test]
    fn test_quality_metrics_threshold() {
        let config = ScoringConfig::default();

        let strong = quality_metrics(&who_with_parties(10), &config);
        assert_eq!(strong.dimension, caselens_core::Dimension::Who);
        assert_eq!(strong.data_points, 10);
        assert!(strong.is_sufficient);

        let weak = quality_metrics(&who_with_parties(3), &config);
        assert_eq!(weak.data_points, 3);
        assert!(!weak.is_sufficient);
        assert!((weak.completeness_score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_case_name_prefers_first_real_name() {
        let placeholder_who = DimensionData::Who(WhoContext::empty("case-1", "Case case-1"));
        let named_what = DimensionData::What(WhatContext::empty("case-1", "Acme v. Widget"));
        let named_why = DimensionData::Why(WhyContext::empty("case-1", "Other Name"));

        let results = vec![Some(placeholder_who), None, Some(named_what), Some(named_why)];
        assert_eq!(resolve_case_name(&results, "case-1"), "Acme v. Widget");
    }

    #[test]
    fn test_resolve_case_name_falls_back_to_case_id() {
        let results = vec![
            Some(DimensionData::Who(WhoContext::empty("case-1", "Case case-1"))),
            None,
        ];
        assert_eq!(resolve_case_name(&results, "case-1"), "Case case-1");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use caselens_core::{Party, WhoContext};
    use proptest::prelude::*;

    fn who_with_parties(count: usize) -> DimensionData {
        let mut who = WhoContext::empty("case-1", "Case case-1");
        for i in 0..count {
            who.parties.push(Party {
                id: format!("p-{i}"),
                name: format!("Party {i}"),
                role: "plaintiff".to_string(),
                entity_type: "person".to_string(),
                case_id: "case-1".to_string(),
                metadata: serde_json::Map::new(),
            });
        }
        DimensionData::Who(who)
    }

    proptest! {
        /// A dimension score never leaves [0, 1], however many data
        /// points pile up.
        #[test]
        fn prop_dimension_score_in_range(count in 0usize..200, target in 1u32..50) {
            let config = ScoringConfig::default().with_data_point_target(target);
            let score = dimension_score(&who_with_parties(count), &config);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        /// Adding data points beyond the target never increases the score
        /// above 1.0 and never decreases it.
        #[test]
        fn prop_score_is_monotone_and_saturating(counts in proptest::collection::vec(0usize..100, 2..10)) {
            let config = ScoringConfig::default();
            let mut sorted = counts.clone();
            sorted.sort_unstable();
            let scores: Vec<f64> = sorted
                .iter()
                .map(|&c| dimension_score(&who_with_parties(c), &config))
                .collect();
            for pair in scores.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
            prop_assert!(scores.iter().all(|s| *s <= 1.0));
        }

        /// The composite score never leaves [0, 1] for any mix of present
        /// and absent dimensions.
        #[test]
        fn prop_composite_in_range(
            presence in proptest::collection::vec(proptest::option::of(0usize..50), 0..5),
        ) {
            let config = ScoringConfig::default();
            let results: Vec<Option<DimensionData>> = presence
                .into_iter()
                .map(|maybe| maybe.map(who_with_parties))
                .collect();
            let score = composite_score(&results, &config);
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }
}
