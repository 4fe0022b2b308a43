//! End-to-end scenarios over synthetic forecaster panels.

use approx::assert_relative_eq;
use seasonal_fusion::config::{EngineConfig, FusionProfile, TuningSet};
use seasonal_fusion::core::{
    Outcome, OutcomeIndex, Prediction, PredictionIndex, GOAL_ACCURACY, TARGET_FEBMAR_MEAN,
};
use seasonal_fusion::ensemble::FeatureCache;
use seasonal_fusion::fusion::{compute_stats, predict_with_profile};
use seasonal_fusion::tuning::{backtest, select_best, tune, BacktestResult};
use seasonal_fusion::FusionEngine;

fn outcome(early: bool) -> Outcome {
    if early {
        Outcome::EarlySpring
    } else {
        Outcome::LongWinter
    }
}

/// Pseudo-random but fixed outcome sequence.
fn is_early(year: i32) -> bool {
    (year * 7) % 10 < 6
}

/// Twelve forecasters who are always right and eight who are always wrong.
fn reliable_panel(years: std::ops::Range<i32>) -> (PredictionIndex, OutcomeIndex) {
    let mut predictions = PredictionIndex::new();
    let mut outcomes = OutcomeIndex::new();
    for year in years {
        let early = is_early(year);
        outcomes.insert(TARGET_FEBMAR_MEAN, year, outcome(early));
        for i in 0..20 {
            let right = i < 12;
            // Seeing the shadow means a long winter.
            let shadow = if right { !early } else { early };
            predictions.push(Prediction::new(year, format!("f{i:02}"), shadow));
        }
    }
    (predictions, outcomes)
}

#[test]
fn single_forecaster_history_drives_held_out_year() {
    let mut predictions = PredictionIndex::new();
    let mut outcomes = OutcomeIndex::new();
    for (i, year) in (1990..2020).enumerate() {
        predictions.push(Prediction::new(year, "phil", false));
        outcomes.insert(TARGET_FEBMAR_MEAN, year, outcome(i % 5 != 0));
    }
    predictions.push(Prediction::new(2020, "phil", false));

    let profile = FusionProfile::new("plain");
    let snapshot = compute_stats(&predictions, &outcomes, TARGET_FEBMAR_MEAN, 2020, &profile);
    let stats = snapshot.get("phil").unwrap();
    assert_eq!(stats.n(), 30);
    assert_eq!(stats.counts.hits, 24);
    assert_relative_eq!(stats.acc_bayes, 26.0 / 34.0, epsilon = 1e-12);

    let pv = predict_with_profile(&predictions, &outcomes, TARGET_FEBMAR_MEAN, 2020, &profile);
    assert!(pv.weighted);
    assert_eq!(pv.verdict.outcome, Some(Outcome::EarlySpring));
    assert_relative_eq!(pv.verdict.certainty, 1.0);
    assert_eq!(pv.verdict.participants, 1);
}

#[test]
fn tuner_prefers_the_more_accurate_set() {
    let candidates = vec![
        ("cautious", BacktestResult::from_counts(31, 50, Some(2020))),
        ("sharp", BacktestResult::from_counts(35, 50, Some(2020))),
    ];
    let (winner, result) = select_best(candidates).unwrap();
    assert_eq!(winner, "sharp");
    assert_relative_eq!(result.accuracy, 0.70);
}

#[test]
fn tuning_picks_the_set_with_the_better_backtest() {
    // Eight forecasters are always right, twelve always wrong: the raw
    // majority is wrong every year while weighted fusion learns to invert it.
    let mut predictions = PredictionIndex::new();
    let mut outcomes = OutcomeIndex::new();
    for year in 1990..2020 {
        let early = is_early(year);
        outcomes.insert(TARGET_FEBMAR_MEAN, year, outcome(early));
        for i in 0..20 {
            let shadow = if i < 8 { !early } else { early };
            predictions.push(Prediction::new(year, format!("f{i:02}"), shadow));
        }
    }
    let profiles = [FusionProfile::new("plain")];
    let cache = FeatureCache::build(&predictions, &outcomes, TARGET_FEBMAR_MEAN, &profiles, 20);

    let mut majority_only = TuningSet::new("majority-only");
    majority_only.stack.min_train = 1000;
    majority_only.blend.min_train = 1000;

    let mut blended = TuningSet::new("blended");
    blended.stack.min_train = 1000;
    blended.blend.min_train = 1;
    blended.min_config_years = 0.0;

    let weak = backtest(&cache, &majority_only);
    let strong = backtest(&cache, &blended);
    assert_eq!(weak.attempts, 30);
    assert_eq!(weak.hits, 0);
    assert!(strong.accuracy > weak.accuracy);

    let model = tune(cache, &[majority_only, blended]).expect("both sets attempt every year");
    assert_eq!(model.tuning.id, "blended");
    assert_eq!(model.backtest.hits, strong.hits);
    assert_eq!(model.backtest.attempts, strong.attempts);
}

#[test]
fn thin_years_are_not_backtested() {
    let (mut predictions, mut outcomes) = reliable_panel(1990..2015);
    // 2015 has an outcome but only 19 predictions.
    outcomes.insert(TARGET_FEBMAR_MEAN, 2015, Outcome::EarlySpring);
    for i in 0..19 {
        predictions.push(Prediction::new(2015, format!("f{i:02}"), false));
    }

    let engine = FusionEngine::with_defaults();
    let cache = engine.feature_cache(&predictions, &outcomes, TARGET_FEBMAR_MEAN);
    assert!(cache.years().contains(&2015));
    assert!(!cache.is_scored(2015));
    assert_eq!(cache.scored_years().len(), 25);

    let result = backtest(&cache, &TuningSet::new("plain"));
    assert_eq!(result.attempts, 25);
    assert_eq!(result.last_year, Some(2014));
}

#[test]
fn default_tables_reach_the_goal_on_a_reliable_panel() {
    let (predictions, outcomes) = reliable_panel(1980..2020);

    let engine = FusionEngine::with_defaults();
    let model = engine
        .build(&predictions, &outcomes, TARGET_FEBMAR_MEAN)
        .expect("panel has scored years");

    let summary = model.summary();
    assert_eq!(summary.target, TARGET_FEBMAR_MEAN);
    assert_eq!(summary.attempts, 40);
    assert_eq!(summary.last_year, Some(2019));
    assert!(summary.accuracy >= GOAL_ACCURACY);
    assert!(summary.goal_reached);
    assert_eq!(
        summary.methods.stacked + summary.methods.blend + summary.methods.majority,
        40
    );
    assert!(engine
        .tuning_sets()
        .iter()
        .any(|set| set.id == summary.tuning_id));

    let late = model.predict(2019);
    assert_eq!(late.outcome(), Some(outcome(is_early(2019))));
}

#[test]
fn engine_from_json_config() {
    let config = EngineConfig::from_json_str(
        r#"{
            "profiles": [
                {"id": "plain"},
                {"id": "recent", "halfLifeYears": 4.0, "contrarian": true}
            ],
            "tuningSets": [{"id": "only", "gate": 0.4}],
            "minForecasters": 10
        }"#,
    )
    .unwrap();
    let engine = FusionEngine::from_config(config).unwrap();
    assert_eq!(engine.profiles().len(), 2);

    let (predictions, outcomes) = reliable_panel(2000..2012);
    let cache: FeatureCache = engine.feature_cache(&predictions, &outcomes, TARGET_FEBMAR_MEAN);
    assert_eq!(cache.profile_count(), 2);
    assert_eq!(cache.scored_years().len(), 12);

    let model = engine
        .build(&predictions, &outcomes, TARGET_FEBMAR_MEAN)
        .unwrap();
    assert_eq!(model.tuning.id, "only");
    assert_eq!(model.backtest.attempts, 12);
}
