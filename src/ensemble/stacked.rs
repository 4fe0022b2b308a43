//! Stacked predictor: recency-weighted logistic regression over profile signals.

use crate::config::StackOptions;
use crate::core::{Outcome, Verdict};
use crate::ensemble::features::FeatureCache;
use crate::utils::{decay_rate, recency_weight, sigmoid};

/// Logistic regression fitted by full-batch gradient descent.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub bias: f64,
}

impl LogisticModel {
    /// Fit on `features` / `labels` (0 or 1) with optional per-sample weights.
    ///
    /// Runs exactly `opts.steps` iterations. Gradients are averaged over the
    /// total sample weight; the L2 term `l2 * w` is added to the weight
    /// gradient only. Returns `None` for empty or zero-width inputs.
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[f64],
        sample_weights: Option<&[f64]>,
        opts: &StackOptions,
    ) -> Option<Self> {
        let m = features.first()?.len();
        if m == 0 {
            return None;
        }
        let n = features.len().min(labels.len());
        let weight_of = |i: usize| sample_weights.and_then(|w| w.get(i).copied()).unwrap_or(1.0);
        let weight_sum: f64 = (0..n).map(weight_of).sum();
        let inv_n = if weight_sum != 0.0 { 1.0 / weight_sum } else { 0.0 };

        let mut model = Self {
            weights: vec![0.0; m],
            bias: 0.0,
        };
        let mut grad_w = vec![0.0; m];

        for _ in 0..opts.steps {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;

            for i in 0..n {
                let x = &features[i];
                let diff = (model.probability(x) - labels[i]) * weight_of(i);
                for (g, xj) in grad_w.iter_mut().zip(x) {
                    *g += diff * xj;
                }
                grad_b += diff;
            }

            for (w, g) in model.weights.iter_mut().zip(&grad_w) {
                let grad = g * inv_n + opts.l2 * *w;
                *w -= opts.lr * grad;
            }
            model.bias -= opts.lr * grad_b * inv_n;
        }

        Some(model)
    }

    /// Linear score `b + w·x`.
    pub fn decision(&self, x: &[f64]) -> f64 {
        self.bias
            + self
                .weights
                .iter()
                .zip(x)
                .map(|(w, xj)| w * xj)
                .sum::<f64>()
    }

    /// Probability of early spring.
    pub fn probability(&self, x: &[f64]) -> f64 {
        sigmoid(self.decision(x))
    }
}

/// Train on prior scored years and predict `year` from the chosen profiles.
///
/// Abstains when fewer than `min_train` usable training years exist or when
/// none of the chosen profiles has a signal for `year`.
pub fn stacked_predict(
    cache: &FeatureCache,
    year: i32,
    profiles: &[usize],
    opts: &StackOptions,
) -> Verdict {
    let train_years = cache.training_years(year, opts.window_years);
    if train_years.len() < opts.min_train {
        return Verdict::abstain();
    }

    let rate = decay_rate(opts.decay_half_life);
    let mut xs = Vec::with_capacity(train_years.len());
    let mut ys = Vec::with_capacity(train_years.len());
    let mut sample_weights = Vec::with_capacity(train_years.len());

    for &train_year in &train_years {
        let Some(label) = cache.label(train_year) else {
            continue;
        };
        let fv = cache.features(train_year, profiles);
        if fv.active == 0 {
            continue;
        }
        xs.push(fv.values);
        ys.push(label.label());
        sample_weights.push(recency_weight(rate, f64::from(year - train_year)));
    }
    if xs.len() < opts.min_train {
        return Verdict::abstain();
    }

    let weights = rate.map(|_| sample_weights.as_slice());
    let Some(model) = LogisticModel::fit(&xs, &ys, weights, opts) else {
        return Verdict::abstain();
    };

    let current = cache.features(year, profiles);
    if current.active == 0 {
        return Verdict::abstain();
    }
    let p = model.probability(&current.values);
    let outcome = if p >= 0.5 {
        Outcome::EarlySpring
    } else {
        Outcome::LongWinter
    };
    Verdict::new(outcome, (p - 0.5).abs() * 2.0, current.active)
}
