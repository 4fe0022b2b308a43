//! Untrained fallback combiner weighting profiles by their track record.

use crate::config::BlendOptions;
use crate::core::{Outcome, Verdict};
use crate::ensemble::features::FeatureCache;
use crate::ensemble::ranking::profile_performance;
use crate::utils::logit;

/// Blend the chosen profiles' current signals by historical accuracy.
///
/// Each profile's weight is `logit(smoothed accuracy) * (1 + ln(1 + n) / 3)
/// * (1 + stability_boost * (stability - 0.5))`, where `n` is the decayed
/// sample count over the blend window. Profiles with fewer than
/// `min_config_years` effective samples or no current signal are skipped.
pub fn blend_predict(
    cache: &FeatureCache,
    year: i32,
    profiles: &[usize],
    opts: &BlendOptions,
    min_config_years: f64,
) -> Verdict {
    let train_years = cache.training_years(year, opts.window_years);
    if train_years.len() < opts.min_train {
        return Verdict::abstain();
    }

    let mut score = 0.0;
    let mut total_abs = 0.0;
    let mut used = 0;
    for &idx in profiles {
        let perf = profile_performance(cache, idx, &train_years, year, opts.decay_half_life);
        if perf.n < min_config_years {
            continue;
        }
        let signal = cache.signal(year, idx);
        if !signal.is_active() {
            continue;
        }
        let stability_factor = 1.0 + opts.stability_boost * (perf.stability - 0.5);
        let weight = logit(perf.smoothed()) * (1.0 + perf.n.ln_1p() / 3.0) * stability_factor;
        score += weight * signal.strength;
        total_abs += weight.abs();
        used += 1;
    }

    if total_abs == 0.0 || !total_abs.is_finite() {
        return Verdict::abstain();
    }
    Verdict::new(
        Outcome::from_score(score),
        (score.abs() / total_abs).min(1.0),
        used,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FusionProfile;
    use crate::core::{OutcomeIndex, Prediction, PredictionIndex};

    fn opts(min_train: usize) -> BlendOptions {
        BlendOptions {
            min_train,
            ..BlendOptions::default()
        }
    }

    fn cache() -> FeatureCache {
        let mut preds = Vec::new();
        let mut outcomes = OutcomeIndex::new();
        for y in 2000..2016 {
            let early = y % 3 != 0;
            outcomes.insert(
                "T",
                y,
                if early {
                    Outcome::EarlySpring
                } else {
                    Outcome::LongWinter
                },
            );
            preds.push(Prediction::new(y, "sage", !early));
            preds.push(Prediction::new(y, "fool", early));
        }
        let index = PredictionIndex::from_predictions(preds);
        let profiles = vec![
            FusionProfile::new("plain"),
            FusionProfile::new("blind").with_min_obs(99),
        ];
        FeatureCache::build(&index, &outcomes, "T", &profiles, 1)
    }

    #[test]
    fn requires_min_train_years() {
        let v = blend_predict(&cache(), 2004, &[0, 1], &opts(8), 1.0);
        assert!(!v.is_prediction());
    }

    #[test]
    fn skips_profiles_below_min_config_years() {
        let v = blend_predict(&cache(), 2015, &[0, 1], &opts(4), 1000.0);
        assert!(!v.is_prediction());
        assert!(v.certainty.is_nan());
    }

    #[test]
    fn trusted_profile_carries_the_blend() {
        let cache = cache();
        // 2014 is an early-spring year; "plain" has been right every year.
        let v = blend_predict(&cache, 2014, &[0], &opts(4), 1.0);
        assert_eq!(v.outcome, Some(Outcome::EarlySpring));
        assert_eq!(v.participants, 1);
        assert!(v.certainty > 0.0 && v.certainty <= 1.0);

        // 2013 is a long-winter year; "blind" ties and leans early spring.
        let both = blend_predict(&cache, 2013, &[0, 1], &opts(4), 1.0);
        assert_eq!(both.outcome, Some(Outcome::LongWinter));
        assert_eq!(both.participants, 2);
        assert!((0.0..=1.0).contains(&both.certainty));
    }
}
