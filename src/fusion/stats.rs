//! Causal per-forecaster accuracy statistics.
//!
//! Statistics for an as-of year only ever read strictly earlier years, so a
//! forecaster's weight for year `Y` cannot depend on the outcome of `Y`.

use std::collections::BTreeMap;

use crate::config::FusionProfile;
use crate::core::{OutcomeIndex, PredictionIndex};
use crate::utils::{
    beta_smoothed, decay_rate, ratio_or, recency_weight, split_year, stability, window_start,
};

/// Raw, decayed, windowed and split-half tallies for one forecaster.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatCounts {
    pub n: usize,
    pub hits: usize,
    pub n_decay: f64,
    pub hits_decay: f64,
    pub n_window: usize,
    pub hits_window: usize,
    pub n_early: usize,
    pub hits_early: usize,
    pub n_late: usize,
    pub hits_late: usize,
}

impl StatCounts {
    fn record(&mut self, correct: bool, decay_weight: f64, in_window: bool, early: bool) {
        let hit = usize::from(correct);
        self.n += 1;
        self.hits += hit;
        self.n_decay += decay_weight;
        if correct {
            self.hits_decay += decay_weight;
        }
        if in_window {
            self.n_window += 1;
            self.hits_window += hit;
        }
        if early {
            self.n_early += 1;
            self.hits_early += hit;
        } else {
            self.n_late += 1;
            self.hits_late += hit;
        }
    }
}

/// Derived accuracy statistics for one forecaster as of a year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecasterStats {
    pub counts: StatCounts,
    pub acc_raw: f64,
    pub acc_bayes: f64,
    pub acc_decay: f64,
    pub acc_window: f64,
    pub stability: f64,
    pub trend: f64,
}

impl ForecasterStats {
    /// Derive accuracies from tallies under a Beta(`prior_a`, `prior_b`) prior.
    pub fn from_counts(counts: StatCounts, prior_a: f64, prior_b: f64) -> Self {
        let n = counts.n as f64;
        let acc_raw = ratio_or(counts.hits as f64, n, f64::NAN);
        let acc_bayes = beta_smoothed(counts.hits as f64, n, prior_a, prior_b);
        let acc_decay = if counts.n_decay != 0.0 {
            beta_smoothed(counts.hits_decay, counts.n_decay, prior_a, prior_b)
        } else {
            acc_bayes
        };
        let acc_window = if counts.n_window != 0 {
            beta_smoothed(
                counts.hits_window as f64,
                counts.n_window as f64,
                prior_a,
                prior_b,
            )
        } else {
            acc_bayes
        };
        let acc_early = ratio_or(counts.hits_early as f64, counts.n_early as f64, acc_raw);
        let acc_late = ratio_or(counts.hits_late as f64, counts.n_late as f64, acc_raw);

        Self {
            counts,
            acc_raw,
            acc_bayes,
            acc_decay,
            acc_window,
            stability: stability(acc_early, acc_late),
            trend: acc_late - acc_early,
        }
    }

    /// Raw number of scored predictions.
    pub fn n(&self) -> usize {
        self.counts.n
    }
}

/// Statistics of every forecaster seen before the as-of year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    pub stats: BTreeMap<String, ForecasterStats>,
    /// Largest raw sample count across forecasters.
    pub max_n: usize,
}

impl StatsSnapshot {
    pub fn get(&self, forecaster: &str) -> Option<&ForecasterStats> {
        self.stats.get(forecaster)
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Compute forecaster statistics for `target` using years strictly before `as_of`.
///
/// Only years with a recorded outcome contribute. They are split at the
/// median position into early and late halves for the stability and trend
/// measures.
pub fn compute_stats(
    predictions: &PredictionIndex,
    outcomes: &OutcomeIndex,
    target: &str,
    as_of: i32,
    profile: &FusionProfile,
) -> StatsSnapshot {
    let years: Vec<i32> = predictions
        .years()
        .filter(|&y| y < as_of && outcomes.contains(target, y))
        .collect();
    let Some(split) = split_year(&years) else {
        return StatsSnapshot::default();
    };

    let rate = decay_rate(profile.half_life_years);
    let window = window_start(as_of, profile.window_years);

    let mut counts: BTreeMap<String, StatCounts> = BTreeMap::new();
    for &year in &years {
        let Some(actual) = outcomes.get(target, year) else {
            continue;
        };
        let decay_weight = recency_weight(rate, f64::from(as_of - year));
        let in_window = window.is_none_or(|start| year >= start);
        let early = year < split;

        for p in predictions.for_year(year) {
            counts
                .entry(p.forecaster.clone())
                .or_default()
                .record(p.outcome() == actual, decay_weight, in_window, early);
        }
    }

    let max_n = counts.values().map(|c| c.n).max().unwrap_or(0);
    let stats = counts
        .into_iter()
        .filter(|(_, c)| c.n > 0)
        .map(|(id, c)| {
            (
                id,
                ForecasterStats::from_counts(c, profile.prior_a, profile.prior_b),
            )
        })
        .collect();

    StatsSnapshot { stats, max_n }
}
