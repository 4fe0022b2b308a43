//! Binary seasonal outcome and the verdict type every predictor returns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FusionError;

/// The two seasonal classes being forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// Warm late winter; encoded as vote `+1` and label `1`.
    EarlySpring,
    /// Cold late winter; encoded as vote `-1` and label `0`.
    LongWinter,
}

impl Outcome {
    /// Map a forecaster's raw shadow observation to the class it signals.
    pub fn from_shadow(shadow_seen: bool) -> Self {
        if shadow_seen {
            Outcome::LongWinter
        } else {
            Outcome::EarlySpring
        }
    }

    /// Class of a signed score; ties go to `EarlySpring`.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.0 {
            Outcome::EarlySpring
        } else {
            Outcome::LongWinter
        }
    }

    /// Class implied by a temperature anomaly: positive means early spring.
    ///
    /// Returns `None` for non-finite anomalies.
    pub fn from_anomaly(anomaly: f64) -> Option<Self> {
        if !anomaly.is_finite() {
            return None;
        }
        Some(if anomaly > 0.0 {
            Outcome::EarlySpring
        } else {
            Outcome::LongWinter
        })
    }

    /// Signed vote: `+1` for early spring, `-1` for long winter.
    pub fn vote(self) -> f64 {
        match self {
            Outcome::EarlySpring => 1.0,
            Outcome::LongWinter => -1.0,
        }
    }

    /// Binary regression label: `1` for early spring, `0` for long winter.
    pub fn label(self) -> f64 {
        match self {
            Outcome::EarlySpring => 1.0,
            Outcome::LongWinter => 0.0,
        }
    }

    /// Canonical label as written in outcome tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::EarlySpring => "EARLY_SPRING",
            Outcome::LongWinter => "LONG_WINTER",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EARLY_SPRING" | "ES" => Ok(Outcome::EarlySpring),
            "LONG_WINTER" | "LW" | "MORE_WINTER" => Ok(Outcome::LongWinter),
            _ => Err(FusionError::InvalidOutcome(s.to_string())),
        }
    }
}

/// A class prediction with its certainty, or an abstention.
///
/// Abstention is an ordinary value: `outcome` is `None`, `certainty` is NaN
/// and no participants contributed. Callers cascade to their next fallback.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Verdict {
    /// Predicted class, `None` when abstaining.
    pub outcome: Option<Outcome>,
    /// Confidence in `[0, 1]`; NaN when abstaining.
    pub certainty: f64,
    /// Number of forecasters (or profiles) that contributed.
    pub participants: usize,
}

impl Verdict {
    /// A definite prediction.
    pub fn new(outcome: Outcome, certainty: f64, participants: usize) -> Self {
        Self {
            outcome: Some(outcome),
            certainty,
            participants,
        }
    }

    /// The "no prediction" sentinel.
    pub fn abstain() -> Self {
        Self {
            outcome: None,
            certainty: f64::NAN,
            participants: 0,
        }
    }

    /// Whether a class was predicted.
    pub fn is_prediction(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether this verdict predicted `actual`.
    pub fn hits(&self, actual: Outcome) -> bool {
        self.outcome == Some(actual)
    }
}

/// Two NaN certainties compare equal, so abstentions equal each other.
impl PartialEq for Verdict {
    fn eq(&self, other: &Self) -> bool {
        let same_certainty = self.certainty == other.certainty
            || (self.certainty.is_nan() && other.certainty.is_nan());
        self.outcome == other.outcome
            && self.participants == other.participants
            && same_certainty
    }
}
