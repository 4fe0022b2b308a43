//! Adaptive ensembling over fusion profiles.
//!
//! The [`FeatureCache`] memoizes every profile's verdict per year. On top of
//! it, the ranker picks the currently best profiles, the stacked and blend
//! predictors combine them, and the dynamic gate chooses among the tiers.

pub mod blend;
pub mod features;
pub mod gate;
pub mod ranking;
pub mod stacked;

pub use blend::blend_predict;
pub use features::{Aggregates, FeatureCache, FeatureVector, Signal, AGGREGATE_FEATURES};
pub use gate::{accept_stacked, dynamic_predict, GateMethod, GateOutcome};
pub use ranking::{profile_performance, select_top_profiles, ProfilePerformance};
pub use stacked::{stacked_predict, LogisticModel};
