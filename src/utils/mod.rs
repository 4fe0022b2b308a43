//! Numeric helpers shared by the fusion and ensemble layers.

pub mod stats;

pub use stats::{
    beta_smoothed, decay_rate, logit, ratio_or, recency_weight, sigmoid, split_year, stability,
    window_start,
};
