use anyhow::{Context, Result};
use clap::Parser;
use aa_pitfalls::cli::{OutputFormat, RunnerCli};
use aa_pitfalls::dataset::{self, Dataset};
use aa_pitfalls::experiment::{run_aa_test, AaTestConfig};
use aa_pitfalls::simulate::{self, SyntheticConfig};
use aa_pitfalls::tracing_setup::init_tracing;

/// Load the dataset from disk, or generate one with --synthetic
fn load(args: &RunnerCli) -> Result<Dataset> {
    if args.synthetic {
        let generated = simulate::generate(&SyntheticConfig {
            users: args.synthetic_users,
            impressions_per_user: args.synthetic_impressions,
            rows_per_impression: args.synthetic_rows,
            seed: args.synthetic_seed,
        })?;
        return Ok(generated.ensure_not_empty()?);
    }

    let options = args.load_options()?;
    Ok(dataset::load_dataset(&args.data_path, &options)?)
}

fn main() -> Result<()> {
    let args = RunnerCli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let base = match &args.config {
        Some(path) => AaTestConfig::from_file(path)?,
        None => AaTestConfig::default(),
    };
    let config = args.apply_overrides(base);
    config.validate()?;

    let dataset = load(&args)?;
    let report = run_aa_test(&dataset, &config)?;

    match args.format {
        OutputFormat::Text => print!("{}", report.to_report_string(args.show_trials)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    Ok(())
}
