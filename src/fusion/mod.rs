//! Per-profile fusion of raw forecaster calls.
//!
//! A [`FusionProfile`](crate::config::FusionProfile) turns each forecaster's
//! causal track record into a signed weight and combines one year's calls
//! into a [`ProfileVerdict`].

pub mod predictor;
pub mod stats;
pub mod weights;

pub use predictor::{majority_vote, predict_with_profile, predict_with_weights, ProfileVerdict};
pub use stats::{compute_stats, ForecasterStats, StatCounts, StatsSnapshot};
pub use weights::{apply_contrarian, build_weights, forecaster_signal, FusionWeights};
