//! Fusion profiles: how historical accuracy becomes a forecaster weight.

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Named hyperparameter bundle for the statistics engine and weight builder.
///
/// Keys deserialize in camelCase (`halfLifeYears`, `wBayes`, ...). Omitted
/// fields take the [`Default`] values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FusionProfile {
    /// Unique profile name.
    pub id: String,
    /// Half-life of the recency decay in years; `None` disables decay.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub half_life_years: Option<f64>,
    /// Length of the trailing accuracy window; `None` means all history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_years: Option<u32>,
    /// Minimum raw sample count before a forecaster receives a weight.
    pub min_obs: usize,
    /// Exponent of the `max(1, n)` sample-size boost.
    pub n_boost: f64,
    /// Beta prior successes.
    pub prior_a: f64,
    /// Beta prior failures.
    pub prior_b: f64,
    pub w_bayes: f64,
    pub w_decay: f64,
    pub w_window: f64,
    pub w_stability: f64,
    pub w_evidence: f64,
    pub w_trend: f64,
    /// Invert the weight of forecasters that are right less than half the time.
    pub contrarian: bool,
}

impl Default for FusionProfile {
    fn default() -> Self {
        Self {
            id: String::new(),
            half_life_years: None,
            window_years: None,
            min_obs: 0,
            n_boost: 0.5,
            prior_a: 2.0,
            prior_b: 2.0,
            w_bayes: 1.0,
            w_decay: 0.0,
            w_window: 0.0,
            w_stability: 0.0,
            w_evidence: 0.0,
            w_trend: 0.0,
            contrarian: false,
        }
    }
}

impl FusionProfile {
    /// Profile with default weights and the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the recency half-life.
    pub fn with_half_life(mut self, years: f64) -> Self {
        self.half_life_years = Some(years);
        self
    }

    /// Set the trailing window length.
    pub fn with_window(mut self, years: u32) -> Self {
        self.window_years = Some(years);
        self
    }

    /// Set the minimum number of observations.
    pub fn with_min_obs(mut self, min_obs: usize) -> Self {
        self.min_obs = min_obs;
        self
    }

    /// Set the Beta prior pair.
    pub fn with_prior(mut self, a: f64, b: f64) -> Self {
        self.prior_a = a;
        self.prior_b = b;
        self
    }

    /// Set the six signal weights in the order
    /// bayes, decay, window, stability, evidence, trend.
    pub fn with_signal_weights(mut self, w: [f64; 6]) -> Self {
        [
            self.w_bayes,
            self.w_decay,
            self.w_window,
            self.w_stability,
            self.w_evidence,
            self.w_trend,
        ] = w;
        self
    }

    /// Set the sample-size boost exponent.
    pub fn with_n_boost(mut self, n_boost: f64) -> Self {
        self.n_boost = n_boost;
        self
    }

    /// Enable or disable the contrarian sign flip.
    pub fn with_contrarian(mut self, contrarian: bool) -> Self {
        self.contrarian = contrarian;
        self
    }

    /// Check that the profile can produce finite weights.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(FusionError::InvalidParameter(
                "fusion profile id must not be empty".to_string(),
            ));
        }
        if !(self.prior_a > 0.0 && self.prior_b > 0.0) {
            return Err(FusionError::InvalidParameter(format!(
                "profile {}: Beta prior must be positive, got ({}, {})",
                self.id, self.prior_a, self.prior_b
            )));
        }
        if let Some(h) = self.half_life_years {
            if !(h > 0.0 && h.is_finite()) {
                return Err(FusionError::InvalidParameter(format!(
                    "profile {}: half-life must be positive, got {h}",
                    self.id
                )));
            }
        }
        super::check_window(&format!("profile {}", self.id), "window_years", self.window_years)?;
        let weights = [
            self.n_boost,
            self.w_bayes,
            self.w_decay,
            self.w_window,
            self.w_stability,
            self.w_evidence,
            self.w_trend,
        ];
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(FusionError::InvalidParameter(format!(
                "profile {}: signal weights must be finite",
                self.id
            )));
        }
        Ok(())
    }
}

fn preset(
    id: &str,
    half_life: f64,
    window: u32,
    min_obs: usize,
    n_boost: f64,
    prior: f64,
    weights: [f64; 6],
    contrarian: bool,
) -> FusionProfile {
    FusionProfile::new(id)
        .with_half_life(half_life)
        .with_window(window)
        .with_min_obs(min_obs)
        .with_n_boost(n_boost)
        .with_prior(prior, prior)
        .with_signal_weights(weights)
        .with_contrarian(contrarian)
}

/// The nine built-in fusion profiles.
pub fn default_profiles() -> Vec<FusionProfile> {
    vec![
        preset("spark", 6.0, 12, 6, 0.45, 2.0, [1.2, 1.6, 0.9, 0.7, 0.5, 0.25], true),
        preset("balanced", 10.0, 18, 8, 0.55, 3.0, [1.4, 1.2, 1.0, 0.8, 0.6, 0.2], true),
        preset("stable", 16.0, 26, 10, 0.6, 4.0, [1.6, 0.9, 1.2, 1.2, 0.7, 0.1], false),
        preset("recency", 4.0, 9, 5, 0.4, 2.0, [0.9, 1.8, 0.8, 0.5, 0.4, 0.35], true),
        preset("legacy", 22.0, 32, 12, 0.7, 5.0, [1.7, 0.6, 1.3, 1.0, 0.9, 0.05], false),
        preset("stability", 12.0, 20, 8, 0.5, 3.0, [1.3, 1.0, 0.9, 1.4, 0.5, 0.15], false),
        preset("window", 9.0, 10, 5, 0.45, 2.0, [1.0, 1.0, 1.6, 0.6, 0.4, 0.2], true),
        preset("momentum", 5.0, 8, 4, 0.35, 2.0, [0.8, 1.7, 0.7, 0.5, 0.3, 0.6], true),
        preset("evidence", 12.0, 24, 12, 0.8, 4.0, [1.2, 0.8, 0.7, 1.0, 1.1, 0.05], false),
    ]
}
