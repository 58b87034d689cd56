// Configuration for A/A test simulation

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::experiment::aggregate::AnalysisLevel;

/// Errors from loading or validating an [`AaTestConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for a repeated A/A test
///
/// # Example
/// ```
/// use aa_pitfalls::experiment::AaTestConfig;
///
/// let config = AaTestConfig::default();
/// assert_eq!(config.alpha, 0.05);
/// assert_eq!(config.levels.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AaTestConfig {
    /// Significance level; a trial with p < alpha counts as a false positive
    pub alpha: f64,

    /// Number of independent assignment trials
    pub trials: usize,

    /// Analysis levels to evaluate, reported in this order
    pub levels: Vec<AnalysisLevel>,

    /// Base salt; trial `t` hashes users with `seed + t`
    pub seed: u64,

    /// Minimum units per arm before a t-test is attempted
    ///
    /// Arms below this size yield a non-significant degenerate result.
    pub min_units_per_arm: usize,

    /// Student's pooled-variance t-test when true, Welch's otherwise
    pub equal_variance: bool,
}

impl Default for AaTestConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            trials: 100,
            levels: AnalysisLevel::ALL.to_vec(),
            seed: 0,
            min_units_per_arm: 2,
            equal_variance: true,
        }
    }
}

impl AaTestConfig {
    /// 99% confidence
    pub fn strict() -> Self {
        Self {
            alpha: 0.01,
            ..Self::default()
        }
    }

    /// 90% confidence
    pub fn permissive() -> Self {
        Self {
            alpha: 0.10,
            ..Self::default()
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    ///
    /// Not validated: a file may be a partial base that CLI flags complete,
    /// so call [`AaTestConfig::validate`] on the merged result.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a TOML config file (see [`AaTestConfig::from_toml_str`])
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }

        if self.trials == 0 {
            return Err(ConfigError::Invalid("trials must be >= 1".to_string()));
        }

        if self.levels.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one analysis level is required".to_string(),
            ));
        }

        for (i, level) in self.levels.iter().enumerate() {
            if self.levels[..i].contains(level) {
                return Err(ConfigError::Invalid(format!(
                    "analysis level '{}' listed more than once",
                    level
                )));
            }
        }

        if self.min_units_per_arm < 2 {
            return Err(ConfigError::Invalid(format!(
                "min_units_per_arm must be >= 2 for t-test, got {}",
                self.min_units_per_arm
            )));
        }

        Ok(())
    }
}
