//! Memoized profile verdicts and the per-year feature vectors built on them.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::FusionProfile;
use crate::core::{Outcome, OutcomeIndex, PredictionIndex, Verdict};
use crate::fusion::{majority_vote, predict_with_profile, ProfileVerdict};
use crate::utils::window_start;

/// Floor of a nonzero signal's strength; certainty scales the rest.
const STRENGTH_FLOOR: f64 = 0.35;
const STRENGTH_SCALE: f64 = 0.65;

/// Number of aggregate features appended after the per-profile pairs.
pub const AGGREGATE_FEATURES: usize = 6;

/// Direction and signed strength of one profile's verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signal {
    /// `+1` early spring, `-1` long winter, `0` abstained.
    pub direction: f64,
    /// `direction * (0.35 + 0.65 * certainty)`.
    pub strength: f64,
}

impl Signal {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        let Some(outcome) = verdict.outcome else {
            return Self::default();
        };
        let direction = outcome.vote();
        let certainty = if verdict.certainty.is_finite() {
            verdict.certainty
        } else {
            0.0
        };
        Self {
            direction,
            strength: direction * (STRENGTH_FLOOR + STRENGTH_SCALE * certainty),
        }
    }

    pub fn is_active(&self) -> bool {
        self.direction != 0.0
    }
}

/// Summary features over a subset of profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregates {
    pub mean_signal: f64,
    pub mean_strength: f64,
    pub mean_abs_strength: f64,
    /// `|sum of directions| / active profiles`.
    pub consensus: f64,
    pub disagreement: f64,
    /// Active profiles over the subset size.
    pub used_ratio: f64,
}

impl Aggregates {
    fn as_array(&self) -> [f64; AGGREGATE_FEATURES] {
        [
            self.mean_signal,
            self.mean_strength,
            self.mean_abs_strength,
            self.consensus,
            self.disagreement,
            self.used_ratio,
        ]
    }
}

/// Feature vector of one year for a chosen subset of profiles.
///
/// Layout: `[direction_0, strength_0, direction_1, strength_1, ..., aggregates]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: Vec<f64>,
    pub aggregates: Aggregates,
    /// Profiles of the subset with a nonzero signal.
    pub active: usize,
}

impl FeatureVector {
    fn from_signals(signals: &[Signal]) -> Self {
        let active = signals.iter().filter(|s| s.is_active()).count();
        let sum_signal: f64 = signals.iter().map(|s| s.direction).sum();
        let sum_strength: f64 = signals.iter().map(|s| s.strength).sum();
        let sum_abs_strength: f64 = signals.iter().map(|s| s.strength.abs()).sum();

        let per_active = |x: f64| if active > 0 { x / active as f64 } else { 0.0 };
        let consensus = per_active(sum_signal.abs());
        let aggregates = Aggregates {
            mean_signal: per_active(sum_signal),
            mean_strength: per_active(sum_strength),
            mean_abs_strength: per_active(sum_abs_strength),
            consensus,
            disagreement: 1.0 - consensus,
            used_ratio: if signals.is_empty() {
                0.0
            } else {
                active as f64 / signals.len() as f64
            },
        };

        let mut values = Vec::with_capacity(signals.len() * 2 + AGGREGATE_FEATURES);
        for s in signals {
            values.push(s.direction);
            values.push(s.strength);
        }
        values.extend(aggregates.as_array());

        Self {
            values,
            aggregates,
            active,
        }
    }
}

/// Every (profile, year) verdict of one evaluation run, plus scoring metadata.
///
/// Built once from immutable inputs and read-only afterwards. Owned by the
/// caller and scoped to one run.
#[derive(Debug, Clone)]
pub struct FeatureCache {
    target: String,
    profiles: Vec<FusionProfile>,
    years: Vec<i32>,
    scored_years: Vec<i32>,
    verdicts: BTreeMap<i32, Vec<ProfileVerdict>>,
    majority: BTreeMap<i32, Verdict>,
    labels: BTreeMap<i32, Outcome>,
}

impl FeatureCache {
    /// Evaluate every profile on every year with predictions.
    ///
    /// A year is scored when it has an outcome for `target` and at least
    /// `min_forecasters` predictions.
    pub fn build(
        predictions: &PredictionIndex,
        outcomes: &OutcomeIndex,
        target: &str,
        profiles: &[FusionProfile],
        min_forecasters: usize,
    ) -> Self {
        let years: Vec<i32> = predictions.years().collect();
        let mut verdicts = BTreeMap::new();
        let mut majority = BTreeMap::new();
        let mut labels = BTreeMap::new();
        let mut scored_years = Vec::new();

        for &year in &years {
            let row = profiles
                .iter()
                .map(|profile| predict_with_profile(predictions, outcomes, target, year, profile))
                .collect::<Vec<_>>();
            verdicts.insert(year, row);
            majority.insert(year, majority_vote(predictions.for_year(year)));

            if let Some(actual) = outcomes.get(target, year) {
                if predictions.count(year) >= min_forecasters {
                    labels.insert(year, actual);
                    scored_years.push(year);
                }
            }
        }

        debug!(
            series = target,
            profiles = profiles.len(),
            years = years.len(),
            scored_years = scored_years.len(),
            min_forecasters,
            "Feature cache built"
        );

        Self {
            target: target.to_string(),
            profiles: profiles.to_vec(),
            years,
            scored_years,
            verdicts,
            majority,
            labels,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn profiles(&self) -> &[FusionProfile] {
        &self.profiles
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    /// Years with at least one prediction, ascending.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Years with an outcome and enough predictions, ascending.
    pub fn scored_years(&self) -> &[i32] {
        &self.scored_years
    }

    pub fn is_scored(&self, year: i32) -> bool {
        self.labels.contains_key(&year)
    }

    /// Ground truth of a scored year.
    pub fn label(&self, year: i32) -> Option<Outcome> {
        self.labels.get(&year).copied()
    }

    /// Memoized verdict of profile `profile` for `year`.
    pub fn verdict(&self, year: i32, profile: usize) -> Option<&ProfileVerdict> {
        self.verdicts.get(&year)?.get(profile)
    }

    /// Unweighted majority vote over all raw predictions of `year`.
    pub fn majority(&self, year: i32) -> Verdict {
        self.majority
            .get(&year)
            .copied()
            .unwrap_or_else(Verdict::abstain)
    }

    /// Scored years strictly before `year`, limited to the trailing window.
    pub fn training_years(&self, year: i32, window_years: Option<u32>) -> Vec<i32> {
        let start = window_start(year, window_years);
        self.scored_years
            .iter()
            .copied()
            .filter(|&y| y < year && start.is_none_or(|s| y >= s))
            .collect()
    }

    /// Signal of one profile for `year`; zero when it made no prediction.
    pub fn signal(&self, year: i32, profile: usize) -> Signal {
        self.verdict(year, profile)
            .map(|v| Signal::from_verdict(&v.verdict))
            .unwrap_or_default()
    }

    /// Feature vector of `year` over the chosen profile indices.
    pub fn features(&self, year: i32, profiles: &[usize]) -> FeatureVector {
        let signals: Vec<Signal> = profiles.iter().map(|&i| self.signal(year, i)).collect();
        FeatureVector::from_signals(&signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Prediction;
    use approx::assert_relative_eq;

    fn verdict(outcome: Outcome, certainty: f64) -> Verdict {
        Verdict::new(outcome, certainty, 1)
    }

    #[test]
    fn signal_strength_is_floored() {
        let s = Signal::from_verdict(&verdict(Outcome::EarlySpring, 0.0));
        assert_eq!(s.direction, 1.0);
        assert_relative_eq!(s.strength, 0.35);

        let s = Signal::from_verdict(&verdict(Outcome::LongWinter, 1.0));
        assert_eq!(s.direction, -1.0);
        assert_relative_eq!(s.strength, -1.0);

        let s = Signal::from_verdict(&verdict(Outcome::LongWinter, f64::NAN));
        assert_relative_eq!(s.strength, -0.35);

        assert_eq!(Signal::from_verdict(&Verdict::abstain()), Signal::default());
    }

    #[test]
    fn aggregates_divide_by_active_profiles() {
        let signals = vec![
            Signal::from_verdict(&verdict(Outcome::EarlySpring, 1.0)),
            Signal::from_verdict(&verdict(Outcome::EarlySpring, 0.0)),
            Signal::from_verdict(&verdict(Outcome::LongWinter, 0.0)),
            Signal::default(),
        ];
        let fv = FeatureVector::from_signals(&signals);
        assert_eq!(fv.active, 3);
        assert_eq!(fv.values.len(), 4 * 2 + AGGREGATE_FEATURES);

        let a = fv.aggregates;
        assert_relative_eq!(a.mean_signal, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(a.mean_strength, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(a.mean_abs_strength, 1.7 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(a.consensus, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(a.disagreement, 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(a.used_ratio, 0.75, epsilon = 1e-12);
        assert_eq!(&fv.values[..2], &[1.0, 1.0]);
    }

    #[test]
    fn silent_subset_has_zero_features() {
        let fv = FeatureVector::from_signals(&[Signal::default(); 2]);
        assert_eq!(fv.active, 0);
        assert_eq!(fv.aggregates.consensus, 0.0);
        assert_eq!(fv.aggregates.disagreement, 1.0);
        assert_eq!(fv.aggregates.used_ratio, 0.0);
        assert_eq!(FeatureVector::from_signals(&[]).values.len(), AGGREGATE_FEATURES);
    }

    #[test]
    fn scored_years_need_outcome_and_coverage() {
        let mut preds = Vec::new();
        for i in 0..20 {
            preds.push(Prediction::new(2000, format!("f{i:02}"), i % 2 == 0));
            preds.push(Prediction::new(2002, format!("f{i:02}"), false));
        }
        for i in 0..19 {
            preds.push(Prediction::new(2001, format!("f{i:02}"), true));
        }
        let index = PredictionIndex::from_predictions(preds);
        let mut outcomes = OutcomeIndex::new();
        outcomes.insert("T", 2000, Outcome::EarlySpring);
        outcomes.insert("T", 2001, Outcome::LongWinter);

        let cache = FeatureCache::build(&index, &outcomes, "T", &[FusionProfile::new("p")], 20);
        assert_eq!(cache.years(), &[2000, 2001, 2002]);
        // 2001 lacks coverage, 2002 lacks an outcome.
        assert_eq!(cache.scored_years(), &[2000]);
        assert_eq!(cache.label(2000), Some(Outcome::EarlySpring));
        assert_eq!(cache.label(2001), None);
        assert!(cache.verdict(2001, 0).is_some());
        assert!(cache.verdict(2001, 1).is_none());
        assert_eq!(cache.majority(2001).outcome, Some(Outcome::LongWinter));
        assert!(!cache.majority(1990).is_prediction());
    }

    #[test]
    fn training_years_respect_window() {
        let mut preds = Vec::new();
        let mut outcomes = OutcomeIndex::new();
        for y in 1990..2000 {
            preds.push(Prediction::new(y, "a", false));
            outcomes.insert("T", y, Outcome::EarlySpring);
        }
        let index = PredictionIndex::from_predictions(preds);
        let cache = FeatureCache::build(&index, &outcomes, "T", &[FusionProfile::new("p")], 1);

        assert_eq!(cache.training_years(1995, None), vec![1990, 1991, 1992, 1993, 1994]);
        assert_eq!(cache.training_years(1995, Some(2)), vec![1993, 1994]);
        assert!(cache.training_years(1990, None).is_empty());
    }
}
