// Repeated A/A trials over every configured analysis level

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::dataset::{Dataset, DatasetError};
use crate::experiment::aggregate::aggregate;
use crate::experiment::assignment::{salt_for_trial, TrialAssignment};
use crate::experiment::config::AaTestConfig;
use crate::experiment::statistics::compare_arms;
use crate::experiment::summary::{AaReport, LevelSummary, TrialResult};

/// Run one trial: assign users once, then test each level on that assignment
pub fn run_trial(
    dataset: &Dataset,
    trial: usize,
    config: &AaTestConfig,
) -> Result<Vec<TrialResult>> {
    let assignment = TrialAssignment::new(dataset, salt_for_trial(config.seed, trial));

    config
        .levels
        .iter()
        .map(|&level| {
            let agg = aggregate(dataset, level, &assignment);
            let comparison = compare_arms(
                &agg.control_ctrs,
                &agg.treatment_ctrs,
                config.min_units_per_arm,
                config.equal_variance,
            )
            .with_context(|| format!("trial {} at {} level", trial, level))?;

            if let Some(reason) = &comparison.degenerate {
                debug!(trial, %level, %reason, "degenerate comparison");
            }

            Ok(TrialResult::new(trial, &agg, comparison, config.alpha))
        })
        .collect()
}

/// Run `config.trials` A/A trials and summarize false positives per level
///
/// # Example
/// ```
/// use aa_pitfalls::dataset::Dataset;
/// use aa_pitfalls::experiment::{run_aa_test, AaTestConfig, AnalysisLevel};
///
/// let dataset = Dataset::from_records(
///     (0..40).map(|i| (format!("imp{}", i), format!("user{}", i % 10), i % 3 == 0)),
/// );
/// let config = AaTestConfig { trials: 5, ..AaTestConfig::default() };
///
/// let report = run_aa_test(&dataset, &config).unwrap();
/// assert_eq!(report.summary(AnalysisLevel::User).unwrap().trials, 5);
/// ```
pub fn run_aa_test(dataset: &Dataset, config: &AaTestConfig) -> Result<AaReport> {
    config.validate()?;
    if dataset.is_empty() {
        return Err(DatasetError::Empty.into());
    }

    let users = dataset.distinct_users().len();
    info!(
        observations = dataset.len(),
        users,
        trials = config.trials,
        alpha = config.alpha,
        "running A/A test"
    );

    let mut trials = Vec::with_capacity(config.trials * config.levels.len());
    for trial in 0..config.trials {
        trials.extend(run_trial(dataset, trial, config)?);
    }

    let summaries: Vec<LevelSummary> = config
        .levels
        .iter()
        .map(|&level| LevelSummary::from_results(level, config.alpha, &trials))
        .collect();

    for summary in &summaries {
        info!(
            level = %summary.level,
            false_positives = summary.false_positives,
            rate = summary.false_positive_rate,
            "level summary"
        );
    }

    Ok(AaReport {
        config: config.clone(),
        observations: dataset.len(),
        users,
        summaries,
        trials,
    })
}
