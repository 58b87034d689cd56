// Two-sample significance test on per-unit CTRs using aprender
//
// - Uses aprender's t-test (Student's pooled variance by default, Welch optional)
// - Uses trueno::Vector for SIMD-optimized mean and variance
// - Degenerate inputs never error: they become a non-significant result
//   with p = 1.0 and a recorded reason

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use trueno::Vector;

/// Why a comparison was not actually tested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degenerate {
    /// An arm has fewer units than the configured minimum
    TooFewUnits { control: usize, treatment: usize },
    /// Per-unit outcomes in an arm are all identical
    ZeroVariance,
    /// The test itself failed or produced a non-finite p-value
    TestFailed(String),
}

impl std::fmt::Display for Degenerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degenerate::TooFewUnits { control, treatment } => write!(
                f,
                "too few units (control={}, treatment={})",
                control, treatment
            ),
            Degenerate::ZeroVariance => write!(f, "zero variance in an arm"),
            Degenerate::TestFailed(reason) => write!(f, "test failed: {}", reason),
        }
    }
}

/// Result of comparing control vs treatment per-unit CTRs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmComparison {
    /// t-statistic (0 when degenerate)
    pub statistic: f32,

    /// Two-tailed p-value (1.0 when degenerate)
    pub pvalue: f32,

    /// Mean per-unit CTR of control
    pub control_mean: f32,

    /// Mean per-unit CTR of treatment
    pub treatment_mean: f32,

    /// Set when the comparison could not be tested
    pub degenerate: Option<Degenerate>,
}

impl ArmComparison {
    /// treatment_mean - control_mean
    pub fn difference(&self) -> f32 {
        self.treatment_mean - self.control_mean
    }

    /// p-value strictly below alpha, never true for degenerate comparisons
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.degenerate.is_none() && (self.pvalue as f64) < alpha
    }

    fn degenerate(control_mean: f32, treatment_mean: f32, reason: Degenerate) -> Self {
        Self {
            statistic: 0.0,
            pvalue: 1.0,
            control_mean,
            treatment_mean,
            degenerate: Some(reason),
        }
    }
}

fn mean_of(samples: &[f32]) -> Result<f32> {
    if samples.is_empty() {
        return Ok(0.0);
    }
    Vector::from_slice(samples)
        .mean()
        .context("Failed to compute mean")
}

fn variance_of(samples: &[f32]) -> Result<f32> {
    Vector::from_slice(samples)
        .variance()
        .context("Failed to compute variance")
}

/// Exactly zero spread: every sample identical
///
/// A small but real variance (sparse clicks) must still be tested, so no
/// absolute tolerance is applied here.
fn has_zero_variance(samples: &[f32]) -> Result<bool> {
    if samples.windows(2).all(|pair| pair[0] == pair[1]) {
        return Ok(true);
    }
    Ok(variance_of(samples)? == 0.0)
}

/// Compare per-unit outcome samples of the two arms
///
/// # Arguments
/// * `control` - per-unit CTRs of the control arm
/// * `treatment` - per-unit CTRs of the treatment arm
/// * `min_units` - minimum units per arm (at least 2 for a t-test)
/// * `equal_var` - pooled-variance Student's test when true, Welch's otherwise
///
/// # Example
/// ```
/// use aa_pitfalls::experiment::compare_arms;
///
/// let control = vec![0.10, 0.12, 0.11, 0.13, 0.10];
/// let treatment = vec![0.50, 0.52, 0.51, 0.53, 0.50];
///
/// let result = compare_arms(&control, &treatment, 2, true).unwrap();
/// assert!(result.pvalue < 0.05);
/// ```
pub fn compare_arms(
    control: &[f32],
    treatment: &[f32],
    min_units: usize,
    equal_var: bool,
) -> Result<ArmComparison> {
    let control_mean = mean_of(control)?;
    let treatment_mean = mean_of(treatment)?;

    let min_units = min_units.max(2);
    if control.len() < min_units || treatment.len() < min_units {
        return Ok(ArmComparison::degenerate(
            control_mean,
            treatment_mean,
            Degenerate::TooFewUnits {
                control: control.len(),
                treatment: treatment.len(),
            },
        ));
    }

    if has_zero_variance(control)? || has_zero_variance(treatment)? {
        return Ok(ArmComparison::degenerate(
            control_mean,
            treatment_mean,
            Degenerate::ZeroVariance,
        ));
    }

    let ttest = match aprender::stats::hypothesis::ttest_ind(control, treatment, equal_var) {
        Ok(ttest) => ttest,
        Err(e) => {
            return Ok(ArmComparison::degenerate(
                control_mean,
                treatment_mean,
                Degenerate::TestFailed(e.to_string()),
            ))
        }
    };

    if !ttest.pvalue.is_finite() {
        return Ok(ArmComparison::degenerate(
            control_mean,
            treatment_mean,
            Degenerate::TestFailed(format!("non-finite p-value {}", ttest.pvalue)),
        ));
    }

    Ok(ArmComparison {
        statistic: ttest.statistic,
        pvalue: ttest.pvalue,
        control_mean,
        treatment_mean,
        degenerate: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_significant_difference() {
        let control = vec![0.10, 0.12, 0.11, 0.13, 0.10];
        let treatment = vec![0.25, 0.27, 0.26, 0.28, 0.25];

        let result = compare_arms(&control, &treatment, 2, true).unwrap();

        assert!(
            result.pvalue < 0.05,
            "p-value {} should be < 0.05",
            result.pvalue
        );
        assert!(result.is_significant(0.05));
        assert!(result.difference() > 0.0);
        assert!(result.degenerate.is_none());
    }

    #[test]
    fn test_no_difference() {
        let control = vec![0.10, 0.12, 0.11, 0.13, 0.10];
        let treatment = vec![0.11, 0.13, 0.10, 0.12, 0.11];

        let result = compare_arms(&control, &treatment, 2, true).unwrap();

        assert!(
            result.pvalue >= 0.05,
            "p-value {} should be >= 0.05",
            result.pvalue
        );
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn test_welch_variant() {
        let control = vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        let treatment = vec![0.4, 0.5, 0.6, 0.5, 0.4, 0.6];

        let result = compare_arms(&control, &treatment, 2, false).unwrap();
        assert!(result.degenerate.is_none());
        assert!(result.pvalue > 0.05);
    }

    #[test]
    fn test_zero_variance_arm_is_not_significant() {
        let control = vec![0.0, 0.0, 0.0, 0.0];
        let treatment = vec![1.0, 0.0, 1.0, 1.0];

        let result = compare_arms(&control, &treatment, 2, true).unwrap();

        assert_eq!(result.degenerate, Some(Degenerate::ZeroVariance));
        assert_eq!(result.pvalue, 1.0);
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn test_identical_constant_arms() {
        let ones = vec![1.0, 1.0, 1.0];
        let result = compare_arms(&ones, &ones, 2, true).unwrap();
        assert_eq!(result.degenerate, Some(Degenerate::ZeroVariance));
    }

    #[test]
    fn test_constant_fractional_arm_is_zero_variance() {
        // 2/3 is not exact in f32, so the computed variance may not be exactly 0
        let control = vec![2.0 / 3.0; 7];
        let treatment = vec![0.1, 0.9, 0.4];

        let result = compare_arms(&control, &treatment, 2, true).unwrap();
        assert_eq!(result.degenerate, Some(Degenerate::ZeroVariance));
    }

    #[test]
    fn test_sparse_arm_with_tiny_variance_is_tested() {
        // One rare click among thousands of non-clicks: variance is tiny but real
        let mut control = vec![0.0; 3000];
        control.push(0.001);
        let treatment = vec![0.0, 0.5, 0.0, 0.2];

        let result = compare_arms(&control, &treatment, 2, true).unwrap();

        assert!(
            result.degenerate.is_none(),
            "sparse arm should be tested, got {:?}",
            result.degenerate
        );
        assert!(result.pvalue.is_finite());
        assert!(result.pvalue < 1.0);
    }

    #[test]
    fn test_too_few_units() {
        let control = vec![0.5];
        let treatment = vec![0.1, 0.9];

        let result = compare_arms(&control, &treatment, 2, true).unwrap();

        assert_eq!(
            result.degenerate,
            Some(Degenerate::TooFewUnits {
                control: 1,
                treatment: 2
            })
        );
        assert!(!result.is_significant(0.05));
    }

    #[test]
    fn test_empty_arm() {
        let result = compare_arms(&[], &[0.1, 0.9], 2, true).unwrap();
        assert_eq!(result.control_mean, 0.0);
        assert!(matches!(
            result.degenerate,
            Some(Degenerate::TooFewUnits { control: 0, .. })
        ));
    }

    #[test]
    fn test_min_units_floor_is_two() {
        let result = compare_arms(&[0.5], &[0.5], 0, true).unwrap();
        assert!(result.degenerate.is_some());
    }
}
