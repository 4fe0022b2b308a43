//! Core data structures: outcomes, verdicts and the two input datasets.

mod dataset;
mod outcome;

pub use dataset::{OutcomeIndex, Prediction, PredictionIndex};
pub use outcome::{Outcome, Verdict};

/// Primary target: CONUS mean of the February and March temperature anomaly.
pub const TARGET_FEBMAR_MEAN: &str = "US_CONUS_FEBMAR_MEAN_ANOM";

/// Secondary target derived from the March anomaly alone.
pub const TARGET_MARCH: &str = "US_CONUS_MAR_ANOM";

/// Minimum predictions a year needs before it is scored or backtested.
pub const MIN_BACKTEST_FORECASTERS: usize = 20;

/// Backtest accuracy the selected model is expected to reach.
pub const GOAL_ACCURACY: f64 = 0.70;
