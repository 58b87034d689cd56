//! Property-based tests for assignment, aggregation, and parsing
//!
//! 1. Same user, same arm, at every analysis level
//! 2. Aggregation conserves observations and clicks
//! 3. False positive counts never exceed trial counts
//! 4. Delimited-line splitting never panics

use aa_pitfalls::dataset::{split_line, Dataset};
use aa_pitfalls::experiment::{
    aggregate, assign_user, run_aa_test, AaTestConfig, AnalysisLevel, Arm, TrialAssignment,
};
use proptest::prelude::*;

fn dataset_strategy() -> impl Strategy<Value = Dataset> {
    prop::collection::vec((0u8..8, 0u8..20, any::<bool>()), 1..60).prop_map(|rows| {
        Dataset::from_records(
            rows.into_iter()
                .map(|(user, imp, click)| (format!("u{}-i{}", user, imp), format!("u{}", user), click)),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_user_arm_consistent_across_levels(dataset in dataset_strategy(), salt in any::<u64>()) {
        let assignment = TrialAssignment::new(&dataset, salt);

        let expected_treated: u64 = dataset
            .observations()
            .iter()
            .filter(|obs| assign_user(&obs.user_id, salt) == Arm::Treatment)
            .count() as u64;

        for level in AnalysisLevel::ALL {
            let agg = aggregate(&dataset, level, &assignment);
            prop_assert_eq!(agg.treatment.observations, expected_treated);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_aggregation_conserves_totals(dataset in dataset_strategy(), salt in any::<u64>()) {
        let assignment = TrialAssignment::new(&dataset, salt);
        let clicks = dataset.observations().iter().filter(|obs| obs.clicked).count() as u64;

        for level in AnalysisLevel::ALL {
            let agg = aggregate(&dataset, level, &assignment);
            prop_assert_eq!(agg.control.observations + agg.treatment.observations, dataset.len() as u64);
            prop_assert_eq!(agg.control.clicks + agg.treatment.clicks, clicks);
            prop_assert!(agg.control_ctrs.iter().chain(&agg.treatment_ctrs).all(|ctr| (0.0..=1.0).contains(ctr)));
        }

        let rows = aggregate(&dataset, AnalysisLevel::Row, &assignment);
        prop_assert_eq!(rows.control.units + rows.treatment.units, dataset.len());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn prop_false_positives_bounded(dataset in dataset_strategy(), trials in 1usize..8, seed in any::<u64>()) {
        let config = AaTestConfig { trials, seed, ..AaTestConfig::default() };
        let report = run_aa_test(&dataset, &config).unwrap();

        for summary in &report.summaries {
            prop_assert_eq!(summary.trials, trials);
            prop_assert!(summary.false_positives <= trials);
            prop_assert!((0.0..=1.0).contains(&summary.false_positive_rate));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_split_line_never_panics(line in ".*", delimiter in prop::sample::select(vec![',', ';', '\t', '|'])) {
        let fields = split_line(&line, delimiter);
        prop_assert!(!fields.is_empty());
    }

    #[test]
    fn prop_split_unquoted_field_count(fields in prop::collection::vec("[a-z0-9_]*", 1..10)) {
        let line = fields.join(",");
        prop_assert_eq!(split_line(&line, ','), fields);
    }
}
