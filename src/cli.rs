//! CLI argument parsing for the A/A test runner and the dataset downloader

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::dataset::{self, ColumnRef, DatasetError, LoadOptions};
use crate::download::{DEFAULT_OUTPUT, DEFAULT_URL};
use crate::experiment::{AaTestConfig, AnalysisLevel};

/// Output format for the A/A report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary blocks (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "aa-test")]
#[command(version)]
#[command(
    about = "Repeated A/A tests showing false positives when analysis and assignment levels differ",
    long_about = None
)]
pub struct RunnerCli {
    /// Path to the dataset file
    #[arg(long = "data-path", value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub data_path: PathBuf,

    /// Field delimiter (single character, or \t / tab)
    #[arg(long, default_value = ",")]
    pub delimiter: String,

    /// Treat the first row of the file as a header row
    ///
    /// Without a header the columns default to click=0, user=1, impression=2;
    /// with one they default to the names click, user_id, impression_id.
    #[arg(long = "has-header")]
    pub has_header: bool,

    /// User id column (zero-based index, or header name with --has-header)
    /// [default: 1, or user_id with --has-header]
    #[arg(long = "user-column", value_name = "COLUMN")]
    pub user_column: Option<ColumnRef>,

    /// Impression id column (zero-based index, or header name with --has-header)
    /// [default: 2, or impression_id with --has-header]
    #[arg(long = "impression-column", value_name = "COLUMN")]
    pub impression_column: Option<ColumnRef>,

    /// Binary click column (zero-based index, or header name with --has-header)
    /// [default: 0, or click with --has-header]
    #[arg(long = "click-column", value_name = "COLUMN")]
    pub click_column: Option<ColumnRef>,

    /// Number of A/A trials (default: 100)
    #[arg(long)]
    pub trials: Option<usize>,

    /// Significance level (default: 0.05)
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Analysis levels to test, comma separated (default: row,impression,user)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub levels: Option<Vec<AnalysisLevel>>,

    /// Base salt; trial t assigns users with hash(user_id, seed + t) (default: 0)
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML file with experiment settings; explicit flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run on a generated clustered dataset instead of --data-path
    #[arg(long)]
    pub synthetic: bool,

    /// Users in the generated dataset
    #[arg(long = "synthetic-users", default_value = "200")]
    pub synthetic_users: usize,

    /// Impressions per user in the generated dataset
    #[arg(long = "synthetic-impressions", default_value = "10")]
    pub synthetic_impressions: usize,

    /// Rows per impression in the generated dataset
    #[arg(long = "synthetic-rows", default_value = "2")]
    pub synthetic_rows: usize,

    /// RNG seed for the generated dataset
    #[arg(long = "synthetic-seed", default_value = "7")]
    pub synthetic_seed: u64,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print one line per trial before the summaries
    #[arg(long = "show-trials")]
    pub show_trials: bool,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}

impl RunnerCli {
    /// Apply explicit flags on top of a base configuration
    pub fn apply_overrides(&self, mut config: AaTestConfig) -> AaTestConfig {
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(levels) = &self.levels {
            config.levels = levels.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config
    }

    /// Dataset options from the flags; unset columns follow the header mode
    pub fn load_options(&self) -> Result<LoadOptions, DatasetError> {
        let defaults = LoadOptions::with_header(self.has_header);
        Ok(LoadOptions {
            delimiter: dataset::parse_delimiter(&self.delimiter)?,
            has_header: self.has_header,
            user_column: self.user_column.clone().unwrap_or(defaults.user_column),
            impression_column: self
                .impression_column
                .clone()
                .unwrap_or(defaults.impression_column),
            click_column: self.click_column.clone().unwrap_or(defaults.click_column),
        })
    }
}

#[derive(Parser, Debug)]
#[command(name = "aa-download")]
#[command(version)]
#[command(about = "Download a sample of the public Criteo click-through-rate dataset", long_about = None)]
pub struct DownloadCli {
    /// Location of the sample dataset to download
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Where to store the downloaded file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Overwrite the existing file if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}
