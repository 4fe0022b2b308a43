//! Grid search over tuning sets and the resulting dynamic super model.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{
    validate_profiles, validate_tuning_sets, EngineConfig, FusionProfile, TuningSet,
};
use crate::core::{OutcomeIndex, PredictionIndex, GOAL_ACCURACY, MIN_BACKTEST_FORECASTERS};
use crate::ensemble::{dynamic_predict, FeatureCache, GateOutcome};
use crate::error::Result;
use crate::tuning::backtest::{backtest, BacktestResult, MethodCounts};

/// Whether `candidate` beats `best`: higher accuracy, then more attempts.
pub fn is_better(candidate: &BacktestResult, best: &BacktestResult) -> bool {
    candidate.accuracy > best.accuracy
        || (candidate.accuracy == best.accuracy && candidate.attempts > best.attempts)
}

/// Pick the best scored candidate, ignoring non-finite accuracies.
///
/// The first candidate wins a complete tie.
pub fn select_best<T>(
    candidates: impl IntoIterator<Item = (T, BacktestResult)>,
) -> Option<(T, BacktestResult)> {
    let mut best: Option<(T, BacktestResult)> = None;
    for (item, result) in candidates {
        if !result.accuracy.is_finite() {
            continue;
        }
        if best.as_ref().is_none_or(|(_, b)| is_better(&result, b)) {
            best = Some((item, result));
        }
    }
    best
}

/// The selected tuning set bound to its feature cache and backtest.
#[derive(Debug, Clone)]
pub struct DynamicSuperModel {
    pub tuning: TuningSet,
    pub backtest: BacktestResult,
    cache: FeatureCache,
}

impl DynamicSuperModel {
    pub fn cache(&self) -> &FeatureCache {
        &self.cache
    }

    pub fn target(&self) -> &str {
        self.cache.target()
    }

    /// Gate prediction for any year present in the cache.
    pub fn predict(&self, year: i32) -> GateOutcome {
        dynamic_predict(&self.cache, year, &self.tuning)
    }

    /// Whether the backtest accuracy reaches [`GOAL_ACCURACY`].
    pub fn goal_reached(&self) -> bool {
        self.backtest.accuracy >= GOAL_ACCURACY
    }

    /// Record handed to the reporting layer.
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            target: self.target().to_string(),
            tuning_id: self.tuning.id.clone(),
            accuracy: self.backtest.accuracy,
            hits: self.backtest.hits,
            attempts: self.backtest.attempts,
            last_year: self.backtest.last_year,
            goal_reached: self.goal_reached(),
            methods: self.backtest.methods,
        }
    }
}

/// Serializable outcome of a tuning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub target: String,
    pub tuning_id: String,
    pub accuracy: f64,
    pub hits: usize,
    pub attempts: usize,
    pub last_year: Option<i32>,
    pub goal_reached: bool,
    pub methods: MethodCounts,
}

/// Backtest every tuning set on `cache` and keep the most accurate.
///
/// Returns `None` when no tuning set attempts a single scored year.
pub fn tune(cache: FeatureCache, tuning_sets: &[TuningSet]) -> Option<DynamicSuperModel> {
    let scored = tuning_sets.iter().map(|set| {
        let result = backtest(&cache, set);
        debug!(
            tuning = %set.id,
            accuracy = result.accuracy,
            attempts = result.attempts,
            "Tuning candidate scored"
        );
        (set, result)
    });
    let Some((tuning, backtest)) = select_best(scored) else {
        warn!(
            series = cache.target(),
            candidates = tuning_sets.len(),
            "No tuning set produced a finite backtest accuracy"
        );
        return None;
    };

    info!(
        series = cache.target(),
        tuning = %tuning.id,
        accuracy = backtest.accuracy,
        attempts = backtest.attempts,
        last_year = ?backtest.last_year,
        "Dynamic super model selected"
    );
    Some(DynamicSuperModel {
        tuning: tuning.clone(),
        backtest,
        cache,
    })
}

/// Engine entry point holding the validated configuration tables.
///
/// # Example
/// ```
/// use seasonal_fusion::core::{Outcome, OutcomeIndex, Prediction, PredictionIndex};
/// use seasonal_fusion::FusionEngine;
///
/// let mut outcomes = OutcomeIndex::new();
/// let mut calls = Vec::new();
/// for year in 1990..2000 {
///     outcomes.insert("T", year, Outcome::EarlySpring);
///     for i in 0..20 {
///         calls.push(Prediction::new(year, format!("f{i}"), i % 4 == 0));
///     }
/// }
/// let predictions = PredictionIndex::from_predictions(calls);
///
/// let engine = FusionEngine::with_defaults();
/// let model = engine.build(&predictions, &outcomes, "T").unwrap();
/// assert_eq!(model.backtest.attempts, 10);
/// ```
#[derive(Debug, Clone)]
pub struct FusionEngine {
    profiles: Vec<FusionProfile>,
    tuning_sets: Vec<TuningSet>,
    min_forecasters: usize,
}

impl FusionEngine {
    /// Validate and adopt the given tables.
    pub fn new(profiles: Vec<FusionProfile>, tuning_sets: Vec<TuningSet>) -> Result<Self> {
        validate_profiles(&profiles)?;
        validate_tuning_sets(&tuning_sets)?;
        Ok(Self {
            profiles,
            tuning_sets,
            min_forecasters: MIN_BACKTEST_FORECASTERS,
        })
    }

    /// Engine with the built-in profile and tuning tables.
    pub fn with_defaults() -> Self {
        let config = EngineConfig::default();
        Self {
            profiles: config.profiles,
            tuning_sets: config.tuning_sets,
            min_forecasters: config.min_forecasters,
        }
    }

    /// Engine from a decoded configuration document.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let engine = Self::new(config.profiles, config.tuning_sets)?;
        Ok(engine.with_min_forecasters(config.min_forecasters))
    }

    /// Set the coverage a year needs to be scored.
    pub fn with_min_forecasters(mut self, min_forecasters: usize) -> Self {
        self.min_forecasters = min_forecasters;
        self
    }

    pub fn profiles(&self) -> &[FusionProfile] {
        &self.profiles
    }

    pub fn tuning_sets(&self) -> &[TuningSet] {
        &self.tuning_sets
    }

    /// Build the run's feature cache for `target`.
    pub fn feature_cache(
        &self,
        predictions: &PredictionIndex,
        outcomes: &OutcomeIndex,
        target: &str,
    ) -> FeatureCache {
        FeatureCache::build(predictions, outcomes, target, &self.profiles, self.min_forecasters)
    }

    /// Build the cache and tune over every tuning set.
    pub fn build(
        &self,
        predictions: &PredictionIndex,
        outcomes: &OutcomeIndex,
        target: &str,
    ) -> Option<DynamicSuperModel> {
        tune(self.feature_cache(predictions, outcomes, target), &self.tuning_sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Outcome, Prediction};
    use crate::error::FusionError;

    #[test]
    fn higher_accuracy_wins() {
        let picked = select_best(vec![
            ("a", BacktestResult::from_counts(62, 100, Some(2020))),
            ("b", BacktestResult::from_counts(70, 100, Some(2020))),
        ]);
        assert_eq!(picked.map(|(id, _)| id), Some("b"));
    }

    #[test]
    fn ties_prefer_more_attempts_then_first() {
        let picked = select_best(vec![
            ("a", BacktestResult::from_counts(6, 10, None)),
            ("b", BacktestResult::from_counts(12, 20, None)),
            ("c", BacktestResult::from_counts(12, 20, None)),
        ]);
        assert_eq!(picked.map(|(id, _)| id), Some("b"));
    }

    #[test]
    fn non_finite_candidates_are_dropped() {
        let picked = select_best(vec![
            ("nan", BacktestResult::from_counts(0, 0, None)),
            ("ok", BacktestResult::from_counts(1, 4, None)),
        ]);
        assert_eq!(picked.map(|(id, _)| id), Some("ok"));

        let none = select_best(vec![("nan", BacktestResult::from_counts(0, 0, None))]);
        assert!(none.is_none());
    }

    #[test]
    fn tune_returns_none_without_scored_years() {
        let index = PredictionIndex::from_predictions(vec![Prediction::new(2000, "a", false)]);
        let cache = FeatureCache::build(
            &index,
            &OutcomeIndex::new(),
            "T",
            &[FusionProfile::new("p")],
            1,
        );
        assert!(tune(cache, &[TuningSet::new("t")]).is_none());
    }

    #[test]
    fn engine_rejects_invalid_tables() {
        assert!(matches!(
            FusionEngine::new(Vec::new(), vec![TuningSet::new("t")]),
            Err(FusionError::EmptyData(_))
        ));
        assert!(matches!(
            FusionEngine::new(
                vec![FusionProfile::new("p")],
                vec![TuningSet::new("t"), TuningSet::new("t")]
            ),
            Err(FusionError::DuplicateId(_))
        ));
    }

    #[test]
    fn summary_reports_the_winner() {
        let mut outcomes = OutcomeIndex::new();
        let mut calls = Vec::new();
        for year in 2000..2008 {
            outcomes.insert("T", year, Outcome::EarlySpring);
            calls.push(Prediction::new(year, "phil", year == 2007));
        }
        let index = PredictionIndex::from_predictions(calls);
        let engine = FusionEngine::new(vec![FusionProfile::new("p")], vec![TuningSet::new("only")])
            .unwrap()
            .with_min_forecasters(1);
        let model = engine.build(&index, &outcomes, "T").unwrap();

        let summary = model.summary();
        assert_eq!(summary.tuning_id, "only");
        assert_eq!(summary.target, "T");
        assert_eq!(summary.attempts, 8);
        assert_eq!(summary.hits, 7);
        assert_eq!(summary.last_year, Some(2007));
        assert!(summary.goal_reached);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["tuningId"], "only");
        assert_eq!(json["methods"]["majority"], 8);
    }
}
