//! # seasonal-fusion
//!
//! Adaptive ensemble forecasting of the seasonal outcome ("early spring" or
//! "long winter") from a panel of binary forecasters.
//!
//! Forecasters are scored causally, using only years before the one being
//! predicted. Fusion profiles turn those scores into weighted votes, and a
//! dynamic gate chooses per year between a stacked logistic model, an
//! accuracy-weighted blend and plain majority voting. The tuner backtests each
//! tuning set over history and keeps the most accurate one.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod ensemble;
pub mod error;
pub mod fusion;
pub mod tuning;
pub mod utils;

pub use error::{FusionError, Result};
pub use tuning::{DynamicSuperModel, FusionEngine};

pub mod prelude {
    pub use crate::config::{EngineConfig, FusionProfile, TuningSet};
    pub use crate::core::{Outcome, OutcomeIndex, Prediction, PredictionIndex, Verdict};
    pub use crate::ensemble::{GateMethod, GateOutcome};
    pub use crate::error::{FusionError, Result};
    pub use crate::tuning::{BacktestResult, DynamicSuperModel, FusionEngine, ModelSummary};
}
