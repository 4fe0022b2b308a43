//! Per-year choice among the stacked, blend and majority-vote tiers.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::config::TuningSet;
use crate::core::{Outcome, Verdict};
use crate::ensemble::blend::blend_predict;
use crate::ensemble::features::FeatureCache;
use crate::ensemble::ranking::select_top_profiles;
use crate::ensemble::stacked::stacked_predict;

/// Which tier produced a gated prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMethod {
    Stacked,
    Blend,
    Majority,
}

impl fmt::Display for GateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateMethod::Stacked => write!(f, "stacked"),
            GateMethod::Blend => write!(f, "blend"),
            GateMethod::Majority => write!(f, "majority"),
        }
    }
}

/// Result of the dynamic gate for one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateOutcome {
    /// No tier could predict (the year has no raw predictions).
    Abstain,
    Stacked(Verdict),
    Blend(Verdict),
    Majority(Verdict),
}

impl GateOutcome {
    pub fn method(&self) -> Option<GateMethod> {
        match self {
            GateOutcome::Abstain => None,
            GateOutcome::Stacked(_) => Some(GateMethod::Stacked),
            GateOutcome::Blend(_) => Some(GateMethod::Blend),
            GateOutcome::Majority(_) => Some(GateMethod::Majority),
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            GateOutcome::Abstain => None,
            GateOutcome::Stacked(v) | GateOutcome::Blend(v) | GateOutcome::Majority(v) => Some(v),
        }
    }

    /// Predicted class, if any tier predicted.
    pub fn outcome(&self) -> Option<Outcome> {
        self.verdict().and_then(|v| v.outcome)
    }

    pub fn is_abstain(&self) -> bool {
        self.outcome().is_none()
    }
}

/// Whether a stacked verdict clears the confidence and coverage gates.
///
/// Coverage is the number of active profiles, both absolute and as a share of
/// the `top_k` profiles the stacker was given.
pub fn accept_stacked(verdict: &Verdict, top_k: usize, tuning: &TuningSet) -> bool {
    if !verdict.is_prediction() {
        return false;
    }
    let used_ratio = if top_k > 0 {
        verdict.participants as f64 / top_k as f64
    } else {
        0.0
    };
    verdict.certainty >= tuning.gate
        && verdict.participants >= tuning.min_models
        && used_ratio >= tuning.min_used_ratio
}

/// Cascade stacked → blend → majority for `year`.
pub fn dynamic_predict(cache: &FeatureCache, year: i32, tuning: &TuningSet) -> GateOutcome {
    let top = select_top_profiles(cache, year, tuning);

    let stacked = stacked_predict(cache, year, &top, &tuning.stack);
    let outcome = if accept_stacked(&stacked, top.len(), tuning) {
        GateOutcome::Stacked(stacked)
    } else {
        let blended = blend_predict(cache, year, &top, &tuning.blend, tuning.min_config_years);
        if blended.is_prediction() {
            GateOutcome::Blend(blended)
        } else {
            let majority = cache.majority(year);
            if majority.is_prediction() {
                GateOutcome::Majority(majority)
            } else {
                GateOutcome::Abstain
            }
        }
    };

    trace!(
        year,
        tuning = %tuning.id,
        top_k = top.len(),
        method = ?outcome.method(),
        outcome = ?outcome.outcome(),
        "Gate decision"
    );
    outcome
}
