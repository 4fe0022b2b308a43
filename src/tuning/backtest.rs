//! Historical replay of the dynamic gate.

use serde::Serialize;
use tracing::debug;

use crate::config::TuningSet;
use crate::ensemble::{dynamic_predict, FeatureCache, GateMethod};

/// How many attempted years each tier decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MethodCounts {
    pub stacked: usize,
    pub blend: usize,
    pub majority: usize,
}

impl MethodCounts {
    fn record(&mut self, method: GateMethod) {
        match method {
            GateMethod::Stacked => self.stacked += 1,
            GateMethod::Blend => self.blend += 1,
            GateMethod::Majority => self.majority += 1,
        }
    }
}

/// Backtest score of one tuning set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BacktestResult {
    /// `hits / attempts`; NaN without attempts.
    pub accuracy: f64,
    pub hits: usize,
    pub attempts: usize,
    /// Last scored year the gate predicted.
    pub last_year: Option<i32>,
    pub methods: MethodCounts,
}

impl BacktestResult {
    /// Result with the given tallies and no per-method breakdown.
    pub fn from_counts(hits: usize, attempts: usize, last_year: Option<i32>) -> Self {
        Self {
            accuracy: if attempts > 0 {
                hits as f64 / attempts as f64
            } else {
                f64::NAN
            },
            hits,
            attempts,
            last_year,
            methods: MethodCounts::default(),
        }
    }
}

/// Replay the dynamic gate over every scored year of the cache.
///
/// Each year is predicted only from strictly earlier years, so the replay is
/// an honest walk-forward estimate.
///
/// # Example
/// ```
/// use seasonal_fusion::config::{FusionProfile, TuningSet};
/// use seasonal_fusion::core::{Outcome, OutcomeIndex, Prediction, PredictionIndex};
/// use seasonal_fusion::ensemble::FeatureCache;
/// use seasonal_fusion::tuning::backtest;
///
/// let mut outcomes = OutcomeIndex::new();
/// let mut calls = Vec::new();
/// for year in 2000..2010 {
///     outcomes.insert("T", year, Outcome::EarlySpring);
///     calls.push(Prediction::new(year, "phil", false));
/// }
/// let predictions = PredictionIndex::from_predictions(calls);
/// let cache = FeatureCache::build(&predictions, &outcomes, "T", &[FusionProfile::new("p")], 1);
///
/// let result = backtest(&cache, &TuningSet::new("t"));
/// assert_eq!(result.attempts, 10);
/// assert_eq!(result.accuracy, 1.0);
/// ```
pub fn backtest(cache: &FeatureCache, tuning: &TuningSet) -> BacktestResult {
    let mut hits = 0;
    let mut attempts = 0;
    let mut last_year = None;
    let mut methods = MethodCounts::default();

    for &year in cache.scored_years() {
        let gated = dynamic_predict(cache, year, tuning);
        let (Some(method), Some(predicted)) = (gated.method(), gated.outcome()) else {
            continue;
        };
        attempts += 1;
        if cache.label(year) == Some(predicted) {
            hits += 1;
        }
        methods.record(method);
        last_year = Some(year);
    }

    let result = BacktestResult {
        methods,
        ..BacktestResult::from_counts(hits, attempts, last_year)
    };
    debug!(
        tuning = %tuning.id,
        accuracy = result.accuracy,
        attempts,
        stacked = methods.stacked,
        blend = methods.blend,
        majority = methods.majority,
        "Backtest finished"
    );
    result
}
