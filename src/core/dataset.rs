//! In-memory prediction and outcome datasets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::Outcome;

/// One forecaster's directional call for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Season year the call applies to.
    pub year: i32,
    /// Stable identifier of the forecaster.
    pub forecaster: String,
    /// Raw observation; `true` signals a long winter.
    pub shadow_seen: bool,
}

impl Prediction {
    pub fn new(year: i32, forecaster: impl Into<String>, shadow_seen: bool) -> Self {
        Self {
            year,
            forecaster: forecaster.into(),
            shadow_seen,
        }
    }

    /// The class this call signals.
    pub fn outcome(&self) -> Outcome {
        Outcome::from_shadow(self.shadow_seen)
    }
}

/// Predictions grouped by year, each year sorted by forecaster id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionIndex {
    by_year: BTreeMap<i32, Vec<Prediction>>,
}

impl PredictionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index, discarding entries without a forecaster id.
    pub fn from_predictions<I>(predictions: I) -> Self
    where
        I: IntoIterator<Item = Prediction>,
    {
        let mut index = Self::new();
        for p in predictions {
            index.push(p);
        }
        index
    }

    /// Insert one prediction, keeping the year's list ordered by forecaster.
    pub fn push(&mut self, prediction: Prediction) {
        if prediction.forecaster.is_empty() {
            return;
        }
        let list = self.by_year.entry(prediction.year).or_default();
        let pos = list.partition_point(|p| p.forecaster <= prediction.forecaster);
        list.insert(pos, prediction);
    }

    /// All predictions recorded for `year`.
    pub fn for_year(&self, year: i32) -> &[Prediction] {
        self.by_year.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of predictions recorded for `year`.
    pub fn count(&self, year: i32) -> usize {
        self.for_year(year).len()
    }

    /// Years with at least one prediction, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.by_year.keys().copied()
    }

    /// Total number of predictions.
    pub fn len(&self) -> usize {
        self.by_year.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_year.is_empty()
    }
}

/// Ground-truth outcomes keyed by `(target series, year)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeIndex {
    by_target: BTreeMap<String, BTreeMap<i32, Outcome>>,
}

impl OutcomeIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of `target` in `year`, replacing any earlier value.
    pub fn insert(&mut self, target: impl Into<String>, year: i32, outcome: Outcome) {
        self.by_target
            .entry(target.into())
            .or_default()
            .insert(year, outcome);
    }

    /// Synthesize a derived series from continuous anomaly values.
    ///
    /// Positive anomalies become early spring; non-finite values are skipped.
    /// Returns the number of outcomes recorded.
    pub fn insert_anomaly_series<I>(&mut self, target: &str, anomalies: I) -> usize
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        let mut added = 0;
        for (year, anomaly) in anomalies {
            if let Some(outcome) = Outcome::from_anomaly(anomaly) {
                self.insert(target, year, outcome);
                added += 1;
            }
        }
        added
    }

    /// Outcome of `target` in `year`, if recorded.
    pub fn get(&self, target: &str, year: i32) -> Option<Outcome> {
        self.by_target.get(target)?.get(&year).copied()
    }

    pub fn contains(&self, target: &str, year: i32) -> bool {
        self.get(target, year).is_some()
    }

    /// Names of all target series.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.by_target.keys().map(String::as_str)
    }

    /// Total number of recorded outcomes.
    pub fn len(&self) -> usize {
        self.by_target.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
