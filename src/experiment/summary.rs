// Per-trial results and per-level summaries of a repeated A/A test

use serde::{Deserialize, Serialize};

use crate::experiment::aggregate::{AnalysisLevel, ArmTotals, LevelAggregate};
use crate::experiment::config::AaTestConfig;
use crate::experiment::statistics::ArmComparison;

/// Snapshot of one arm in one trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmSnapshot {
    #[serde(flatten)]
    pub totals: ArmTotals,
    /// Mean of per-unit CTRs
    pub mean_ctr: f32,
}

/// Outcome of one trial at one analysis level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial: usize,
    pub level: AnalysisLevel,
    pub control: ArmSnapshot,
    pub treatment: ArmSnapshot,
    pub comparison: ArmComparison,
    /// p < alpha; under the A/A null every such trial is a false positive
    pub significant: bool,
}

impl TrialResult {
    pub fn new(
        trial: usize,
        aggregate: &LevelAggregate,
        comparison: ArmComparison,
        alpha: f64,
    ) -> Self {
        Self {
            trial,
            level: aggregate.level,
            control: ArmSnapshot {
                totals: aggregate.control,
                mean_ctr: comparison.control_mean,
            },
            treatment: ArmSnapshot {
                totals: aggregate.treatment,
                mean_ctr: comparison.treatment_mean,
            },
            significant: comparison.is_significant(alpha),
            comparison,
        }
    }

    /// One-line human-readable description
    pub fn to_line(&self) -> String {
        let mut line = format!(
            "trial={} level={} control(n={}, ctr={:.4}) treatment(n={}, ctr={:.4}) diff={:+.4} p={:.6}",
            self.trial,
            self.level,
            self.control.totals.units,
            self.control.mean_ctr,
            self.treatment.totals.units,
            self.treatment.mean_ctr,
            self.comparison.difference(),
            self.comparison.pvalue,
        );
        if self.significant {
            line.push_str(" *");
        }
        if let Some(reason) = &self.comparison.degenerate {
            line.push_str(&format!(" [{}]", reason));
        }
        line
    }
}

/// False positive tally for one analysis level across all trials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelSummary {
    pub level: AnalysisLevel,
    pub trials: usize,
    pub alpha: f64,
    pub false_positives: usize,
    pub false_positive_rate: f64,
    /// Trials that could not be tested and counted as non-significant
    pub degenerate_trials: usize,
    pub mean_p_value: f64,
}

impl LevelSummary {
    /// Tally the results belonging to `level`
    pub fn from_results(level: AnalysisLevel, alpha: f64, results: &[TrialResult]) -> Self {
        let level_results: Vec<&TrialResult> =
            results.iter().filter(|r| r.level == level).collect();

        let trials = level_results.len();
        let false_positives = level_results.iter().filter(|r| r.significant).count();
        let degenerate_trials = level_results
            .iter()
            .filter(|r| r.comparison.degenerate.is_some())
            .count();

        let (false_positive_rate, mean_p_value) = if trials == 0 {
            (0.0, 0.0)
        } else {
            let p_sum: f64 = level_results
                .iter()
                .map(|r| r.comparison.pvalue as f64)
                .sum();
            (
                false_positives as f64 / trials as f64,
                p_sum / trials as f64,
            )
        };

        Self {
            level,
            trials,
            alpha,
            false_positives,
            false_positive_rate,
            degenerate_trials,
            mean_p_value,
        }
    }

    /// Human-readable summary block
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("Level: {}\n", self.level));
        report.push_str(&format!("Trials: {}\n", self.trials));
        report.push_str(&format!("Alpha: {}\n", self.alpha));
        report.push_str(&format!(
            "False positives: {} ({:.2}%)\n",
            self.false_positives,
            self.false_positive_rate * 100.0
        ));
        if self.degenerate_trials > 0 {
            report.push_str(&format!(
                "Degenerate trials (non-significant): {}\n",
                self.degenerate_trials
            ));
        }
        report
    }
}

/// Full output of a repeated A/A test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AaReport {
    pub config: AaTestConfig,
    pub observations: usize,
    pub users: usize,
    pub summaries: Vec<LevelSummary>,
    pub trials: Vec<TrialResult>,
}

impl AaReport {
    pub fn summary(&self, level: AnalysisLevel) -> Option<&LevelSummary> {
        self.summaries.iter().find(|s| s.level == level)
    }

    /// Human-readable report: one block per level, optionally every trial
    pub fn to_report_string(&self, show_trials: bool) -> String {
        let mut report = String::new();
        report.push_str(&format!(
            "A/A test: {} observations, {} users, assignment by user\n\n",
            self.observations, self.users
        ));

        if show_trials {
            for trial in &self.trials {
                report.push_str(&trial.to_line());
                report.push('\n');
            }
            report.push('\n');
        }

        let blocks: Vec<String> = self
            .summaries
            .iter()
            .map(LevelSummary::to_report_string)
            .collect();
        report.push_str(&blocks.join("\n"));

        report
    }
}
