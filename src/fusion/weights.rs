//! Turn forecaster statistics into normalized signed weights.

use std::collections::BTreeMap;

use crate::config::FusionProfile;
use crate::fusion::stats::{ForecasterStats, StatsSnapshot};
use crate::utils::logit;

/// Weights smaller than this are dropped before normalization.
const MIN_ABS_WEIGHT: f64 = 1e-9;

/// Signed per-forecaster weights for one (profile, year).
///
/// Either empty or normalized so that the absolute weights sum to one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusionWeights {
    weights: BTreeMap<String, f64>,
}

impl FusionWeights {
    pub fn get(&self, forecaster: &str) -> Option<f64> {
        self.weights.get(forecaster).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(id, &w)| (id.as_str(), w))
    }

    /// Sum of absolute weights: `1` or `0`.
    pub fn total_abs(&self) -> f64 {
        self.weights.values().map(|w| w.abs()).sum()
    }

    fn normalized(raw: BTreeMap<String, f64>) -> Self {
        let total: f64 = raw.values().map(|w| w.abs()).sum();
        if total == 0.0 || !total.is_finite() {
            return Self::default();
        }
        Self {
            weights: raw.into_iter().map(|(id, w)| (id, w / total)).collect(),
        }
    }
}

/// Unscaled combined signal of one forecaster.
///
/// `evidence` is the forecaster's log sample size relative to the busiest one.
pub fn forecaster_signal(stats: &ForecasterStats, evidence: f64, profile: &FusionProfile) -> f64 {
    let stability = if stats.stability.is_finite() {
        stats.stability
    } else {
        0.5
    };
    profile.w_bayes * logit(stats.acc_bayes)
        + profile.w_decay * logit(stats.acc_decay)
        + profile.w_window * logit(stats.acc_window)
        + profile.w_stability * ((stability - 0.5) * 2.0)
        + profile.w_evidence * evidence
        + profile.w_trend * stats.trend
}

/// Contrarian flip: invert forecasters that are wrong more often than right.
pub fn apply_contrarian(signal: f64, acc_bayes: f64, contrarian: bool) -> f64 {
    if contrarian && acc_bayes < 0.5 {
        -signal
    } else {
        signal
    }
}

/// Build normalized weights for every forecaster with at least `min_obs` samples.
pub fn build_weights(snapshot: &StatsSnapshot, profile: &FusionProfile) -> FusionWeights {
    let evidence_denom = (snapshot.max_n as f64).ln_1p();
    let mut raw = BTreeMap::new();

    for (id, stats) in &snapshot.stats {
        let n = stats.n();
        if n < profile.min_obs {
            continue;
        }
        let evidence = if evidence_denom > 0.0 {
            (n as f64).ln_1p() / evidence_denom
        } else {
            0.0
        };
        let signal = forecaster_signal(stats, evidence, profile);
        if !signal.is_finite() {
            continue;
        }
        let boost = (n.max(1) as f64).powf(profile.n_boost);
        let weight = apply_contrarian(signal, stats.acc_bayes, profile.contrarian) * boost;
        if weight.abs() < MIN_ABS_WEIGHT {
            continue;
        }
        raw.insert(id.clone(), weight);
    }

    FusionWeights::normalized(raw)
}
