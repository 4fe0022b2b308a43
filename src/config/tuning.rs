//! Tuning sets: hyperparameters of the ranking, stacking and gating layers.

use serde::{Deserialize, Serialize};

use crate::error::{FusionError, Result};

/// Options of the stacked logistic-regression predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StackOptions {
    /// Full-batch gradient steps.
    pub steps: usize,
    /// Learning rate.
    pub lr: f64,
    /// L2 penalty on the weights (the bias is not penalized).
    pub l2: f64,
    /// Minimum number of training years.
    pub min_train: usize,
    /// Half-life of the per-sample recency weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay_half_life: Option<f64>,
    /// Trailing training window in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_years: Option<u32>,
}

impl Default for StackOptions {
    fn default() -> Self {
        Self {
            steps: 200,
            lr: 0.2,
            l2: 0.01,
            min_train: 12,
            decay_half_life: None,
            window_years: None,
        }
    }
}

/// Options of the weighted-blend predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlendOptions {
    /// Minimum number of training years.
    pub min_train: usize,
    /// Trailing training window in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_years: Option<u32>,
    /// Half-life of the recency weight applied to past hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decay_half_life: Option<f64>,
    /// Scale of the split-half stability adjustment.
    pub stability_boost: f64,
}

impl Default for BlendOptions {
    fn default() -> Self {
        Self {
            min_train: 8,
            window_years: None,
            decay_half_life: None,
            stability_boost: 0.0,
        }
    }
}

/// Named bundle of gating hyperparameters evaluated by the tuner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TuningSet {
    pub id: String,
    /// Minimum stacked certainty to accept the stacked verdict.
    pub gate: f64,
    /// Number of top-ranked profiles fed to the ensemble.
    pub top_k: usize,
    /// Minimum profiles with a nonzero signal for the stacked verdict.
    pub min_models: usize,
    /// Minimum share of the top-K profiles with a nonzero signal.
    pub min_used_ratio: f64,
    /// Minimum effective (decayed) sample count to rank or blend a profile.
    pub min_config_years: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_window_years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_decay_half_life: Option<f64>,
    pub stack: StackOptions,
    pub blend: BlendOptions,
}

impl Default for TuningSet {
    fn default() -> Self {
        Self {
            id: String::new(),
            gate: 0.5,
            top_k: usize::MAX,
            min_models: 1,
            min_used_ratio: 0.0,
            min_config_years: 6.0,
            rank_window_years: None,
            rank_decay_half_life: None,
            stack: StackOptions::default(),
            blend: BlendOptions::default(),
        }
    }
}

impl TuningSet {
    /// Tuning set with default values and the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Check ranges of the gating parameters.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(FusionError::InvalidParameter(msg)) };
        if self.id.trim().is_empty() {
            return invalid("tuning set id must not be empty".to_string());
        }
        if self.top_k == 0 {
            return invalid(format!("tuning set {}: top_k must be positive", self.id));
        }
        if !(0.0..=1.0).contains(&self.gate) {
            return invalid(format!(
                "tuning set {}: gate must lie in [0, 1], got {}",
                self.id, self.gate
            ));
        }
        if !(0.0..=1.0).contains(&self.min_used_ratio) {
            return invalid(format!(
                "tuning set {}: min_used_ratio must lie in [0, 1], got {}",
                self.id, self.min_used_ratio
            ));
        }
        if !(self.stack.lr > 0.0 && self.stack.lr.is_finite()) || self.stack.l2 < 0.0 {
            return invalid(format!(
                "tuning set {}: stack learning rate must be positive and l2 non-negative",
                self.id
            ));
        }
        if !self.min_config_years.is_finite() || !self.blend.stability_boost.is_finite() {
            return invalid(format!("tuning set {}: parameters must be finite", self.id));
        }
        let owner = format!("tuning set {}", self.id);
        super::check_window(&owner, "rank_window_years", self.rank_window_years)?;
        super::check_window(&owner, "stack.window_years", self.stack.window_years)?;
        super::check_window(&owner, "blend.window_years", self.blend.window_years)
    }
}

fn preset(
    id: &str,
    gate: f64,
    top_k: usize,
    min_models: usize,
    min_used_ratio: f64,
    min_config_years: f64,
    rank: (u32, f64),
    stack: StackOptions,
    blend: BlendOptions,
) -> TuningSet {
    TuningSet {
        id: id.to_string(),
        gate,
        top_k,
        min_models,
        min_used_ratio,
        min_config_years,
        rank_window_years: Some(rank.0),
        rank_decay_half_life: Some(rank.1),
        stack,
        blend,
    }
}

fn stack(
    steps: usize,
    lr: f64,
    l2: f64,
    min_train: usize,
    half_life: f64,
    window: u32,
) -> StackOptions {
    StackOptions {
        steps,
        lr,
        l2,
        min_train,
        decay_half_life: Some(half_life),
        window_years: Some(window),
    }
}

fn blend(min_train: usize, window: u32, half_life: f64, stability_boost: f64) -> BlendOptions {
    BlendOptions {
        min_train,
        window_years: Some(window),
        decay_half_life: Some(half_life),
        stability_boost,
    }
}

/// The five built-in tuning sets.
pub fn default_tuning_sets() -> Vec<TuningSet> {
    vec![
        preset(
            "balanced",
            0.56,
            6,
            3,
            0.45,
            8.0,
            (24, 12.0),
            stack(260, 0.22, 0.06, 12, 12.0, 30),
            blend(8, 26, 10.0, 0.8),
        ),
        preset(
            "aggressive",
            0.60,
            5,
            2,
            0.35,
            6.0,
            (18, 8.0),
            stack(300, 0.26, 0.05, 10, 8.0, 20),
            blend(7, 16, 6.0, 0.5),
        ),
        preset(
            "steady",
            0.54,
            7,
            4,
            0.55,
            10.0,
            (32, 16.0),
            stack(240, 0.18, 0.08, 14, 16.0, 35),
            blend(9, 30, 14.0, 1.1),
        ),
        preset(
            "recency",
            0.58,
            4,
            2,
            0.35,
            6.0,
            (12, 4.0),
            stack(280, 0.24, 0.05, 9, 6.0, 12),
            blend(7, 10, 4.0, 0.3),
        ),
        preset(
            "conservative",
            0.52,
            8,
            5,
            0.6,
            12.0,
            (40, 20.0),
            stack(220, 0.16, 0.1, 16, 20.0, 40),
            blend(10, 35, 18.0, 1.2),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tuning_sets_are_valid() {
        let sets = default_tuning_sets();
        assert_eq!(sets.len(), 5);
        for set in &sets {
            set.validate().unwrap();
        }
        let balanced = &sets[0];
        assert_eq!(balanced.id, "balanced");
        assert_eq!(balanced.top_k, 6);
        assert_eq!(balanced.stack.steps, 260);
        assert_eq!(balanced.blend.stability_boost, 0.8);
        assert_eq!(balanced.rank_window_years, Some(24));
    }

    #[test]
    fn nested_options_deserialize_from_camel_case() {
        let json = r#"{
            "id": "probe",
            "gate": 0.6,
            "topK": 3,
            "minUsedRatio": 0.5,
            "stack": {"steps": 50, "minTrain": 5, "decayHalfLife": 4},
            "blend": {"stabilityBoost": 0.9}
        }"#;
        let set: TuningSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.top_k, 3);
        assert_eq!(set.min_config_years, 6.0);
        assert_eq!(set.stack.steps, 50);
        assert_eq!(set.stack.lr, 0.2);
        assert_eq!(set.stack.decay_half_life, Some(4.0));
        assert_eq!(set.blend.min_train, 8);
        assert_eq!(set.blend.stability_boost, 0.9);
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut set = TuningSet::new("bad");
        set.top_k = 0;
        assert!(set.validate().is_err());

        let mut set = TuningSet::new("bad");
        set.gate = 1.5;
        assert!(set.validate().is_err());

        let mut set = TuningSet::new("bad");
        set.min_used_ratio = -0.1;
        assert!(set.validate().is_err());

        let mut set = TuningSet::new("bad");
        set.stack.lr = 0.0;
        assert!(set.validate().is_err());
    }
}
