//! Rank fusion profiles by their recent backtested accuracy.

use std::cmp::Ordering;

use crate::config::TuningSet;
use crate::ensemble::features::FeatureCache;
use crate::utils::{beta_smoothed, decay_rate, ratio_or, recency_weight, split_year, stability};

/// Decayed track record of one profile over a set of training years.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePerformance {
    /// Decayed hit weight.
    pub hits: f64,
    /// Decayed attempt weight (effective sample count).
    pub n: f64,
    /// `hits / n`, NaN without attempts.
    pub accuracy: f64,
    /// Split-half stability in `[0, 1]`; 0.5 when undefined.
    pub stability: f64,
}

impl ProfilePerformance {
    /// Beta(2, 2)-smoothed accuracy.
    pub fn smoothed(&self) -> f64 {
        beta_smoothed(self.hits, self.n, 2.0, 2.0)
    }
}

/// Score profile `profile` on `train_years` as seen from `current_year`.
///
/// Only years in which the profile predicted count. Each counts with weight
/// `exp(-ln2 / half_life * (current_year - year))`.
pub fn profile_performance(
    cache: &FeatureCache,
    profile: usize,
    train_years: &[i32],
    current_year: i32,
    decay_half_life: Option<f64>,
) -> ProfilePerformance {
    let rate = decay_rate(decay_half_life);
    let split = split_year(train_years);

    let (mut hits, mut n) = (0.0, 0.0);
    let (mut hits_early, mut n_early) = (0.0, 0.0);
    let (mut hits_late, mut n_late) = (0.0, 0.0);

    for &year in train_years {
        let Some(verdict) = cache.verdict(year, profile).map(|v| v.verdict) else {
            continue;
        };
        let (Some(predicted), Some(actual)) = (verdict.outcome, cache.label(year)) else {
            continue;
        };
        let correct = predicted == actual;
        let weight = recency_weight(rate, f64::from(current_year - year));

        n += weight;
        if correct {
            hits += weight;
        }
        if split.is_some_and(|s| year < s) {
            n_early += weight;
            if correct {
                hits_early += weight;
            }
        } else {
            n_late += weight;
            if correct {
                hits_late += weight;
            }
        }
    }

    let accuracy = ratio_or(hits, n, f64::NAN);
    let acc_early = ratio_or(hits_early, n_early, accuracy);
    let acc_late = ratio_or(hits_late, n_late, accuracy);
    let stability = if acc_early.is_finite() && acc_late.is_finite() {
        stability(acc_early, acc_late)
    } else {
        0.5
    };

    ProfilePerformance {
        hits,
        n,
        accuracy,
        stability,
    }
}

/// Indices of the top-K profiles for `year`.
///
/// Falls back to every profile, in table order, when there are no training
/// years or no profile reaches `min_config_years` effective samples.
pub fn select_top_profiles(cache: &FeatureCache, year: i32, tuning: &TuningSet) -> Vec<usize> {
    let all: Vec<usize> = (0..cache.profile_count()).collect();
    let train_years = cache.training_years(year, tuning.rank_window_years);
    if train_years.is_empty() {
        return all;
    }

    let mut ranked: Vec<(usize, f64, f64)> = all
        .iter()
        .filter_map(|&idx| {
            let perf =
                profile_performance(cache, idx, &train_years, year, tuning.rank_decay_half_life);
            if !perf.accuracy.is_finite() || perf.n < tuning.min_config_years {
                return None;
            }
            Some((idx, perf.smoothed(), perf.n))
        })
        .collect();

    if ranked.is_empty() {
        return all;
    }

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal))
    });
    let k = tuning.top_k.min(ranked.len()).max(1);
    ranked.into_iter().take(k).map(|(idx, _, _)| idx).collect()
}
