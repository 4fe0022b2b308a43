//! Configuration tables passed explicitly into the engine.
//!
//! Fusion profiles and tuning sets are immutable values. The built-in tables
//! are available from [`default_profiles`] and [`default_tuning_sets`]; custom
//! tables can be loaded from JSON with [`EngineConfig::from_json_str`].

mod profile;
mod tuning;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::MIN_BACKTEST_FORECASTERS;
use crate::error::{FusionError, Result};

pub use profile::{default_profiles, FusionProfile};
pub use tuning::{default_tuning_sets, BlendOptions, StackOptions, TuningSet};

/// Complete engine configuration.
///
/// # Example
/// ```
/// use seasonal_fusion::config::EngineConfig;
///
/// let config = EngineConfig::from_json_str(
///     r#"{"profiles": [{"id": "plain"}], "tuningSets": [{"id": "one", "topK": 1}]}"#,
/// )
/// .unwrap();
/// assert_eq!(config.profiles.len(), 1);
/// assert_eq!(config.min_forecasters, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub profiles: Vec<FusionProfile>,
    pub tuning_sets: Vec<TuningSet>,
    /// Minimum predictions for a year to count as scored.
    pub min_forecasters: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            tuning_sets: default_tuning_sets(),
            min_forecasters: MIN_BACKTEST_FORECASTERS,
        }
    }
}

impl EngineConfig {
    /// Decode and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate both tables.
    pub fn validate(&self) -> Result<()> {
        validate_profiles(&self.profiles)?;
        validate_tuning_sets(&self.tuning_sets)
    }
}

/// Check a profile table: nonempty, unique ids, each profile valid.
pub fn validate_profiles(profiles: &[FusionProfile]) -> Result<()> {
    if profiles.is_empty() {
        return Err(FusionError::EmptyData("fusion profiles".to_string()));
    }
    ensure_unique(profiles.iter().map(|p| p.id.as_str()))?;
    profiles.iter().try_for_each(FusionProfile::validate)
}

/// Check a tuning table: nonempty, unique ids, each set valid.
pub fn validate_tuning_sets(sets: &[TuningSet]) -> Result<()> {
    if sets.is_empty() {
        return Err(FusionError::EmptyData("tuning sets".to_string()));
    }
    ensure_unique(sets.iter().map(|s| s.id.as_str()))?;
    sets.iter().try_for_each(TuningSet::validate)
}

/// Reject trailing windows wider than the `i32` year range.
fn check_window(owner: &str, field: &str, window_years: Option<u32>) -> Result<()> {
    match window_years {
        Some(w) if i32::try_from(w).is_err() => Err(FusionError::InvalidParameter(format!(
            "{owner}: {field} must not exceed {}, got {w}",
            i32::MAX
        ))),
        _ => Ok(()),
    }
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(FusionError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}
