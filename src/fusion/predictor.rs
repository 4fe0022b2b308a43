//! Apply one profile's weights to a year's raw predictions.

use serde::Serialize;

use crate::config::FusionProfile;
use crate::core::{Outcome, OutcomeIndex, Prediction, PredictionIndex, Verdict};
use crate::fusion::stats::compute_stats;
use crate::fusion::weights::{build_weights, FusionWeights};

/// Verdict of one fusion profile for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileVerdict {
    pub verdict: Verdict,
    /// `false` when the profile fell back to the unweighted majority vote.
    pub weighted: bool,
}

impl ProfileVerdict {
    pub fn abstain() -> Self {
        Self {
            verdict: Verdict::abstain(),
            weighted: false,
        }
    }
}

/// Unweighted majority vote; ties go to early spring.
///
/// Certainty is the winning share of the votes.
pub fn majority_vote(predictions: &[Prediction]) -> Verdict {
    let early = predictions
        .iter()
        .filter(|p| p.outcome() == Outcome::EarlySpring)
        .count();
    let late = predictions.len() - early;
    let used = early + late;
    if used == 0 {
        return Verdict::abstain();
    }
    let outcome = if early >= late {
        Outcome::EarlySpring
    } else {
        Outcome::LongWinter
    };
    Verdict::new(outcome, early.max(late) as f64 / used as f64, used)
}

/// Weighted vote of the forecasters that carry a weight.
///
/// Falls back to [`majority_vote`] over all predictions when none do.
pub fn predict_with_weights(predictions: &[Prediction], weights: &FusionWeights) -> ProfileVerdict {
    let mut score = 0.0;
    let mut total_abs = 0.0;
    let mut used = 0;
    for p in predictions {
        let Some(w) = weights.get(&p.forecaster) else {
            continue;
        };
        score += w * p.outcome().vote();
        total_abs += w.abs();
        used += 1;
    }

    if total_abs == 0.0 {
        return ProfileVerdict {
            verdict: majority_vote(predictions),
            weighted: false,
        };
    }

    ProfileVerdict {
        verdict: Verdict::new(
            Outcome::from_score(score),
            (score.abs() / total_abs).min(1.0),
            used,
        ),
        weighted: true,
    }
}

/// Full profile pipeline for one year: statistics, weights, weighted vote.
pub fn predict_with_profile(
    predictions: &PredictionIndex,
    outcomes: &OutcomeIndex,
    target: &str,
    year: i32,
    profile: &FusionProfile,
) -> ProfileVerdict {
    let calls = predictions.for_year(year);
    if calls.is_empty() {
        return ProfileVerdict::abstain();
    }
    let snapshot = compute_stats(predictions, outcomes, target, year, profile);
    let weights = build_weights(&snapshot, profile);
    predict_with_weights(calls, &weights)
}
