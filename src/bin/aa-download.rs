use anyhow::Result;
use clap::Parser;
use aa_pitfalls::cli::DownloadCli;
use aa_pitfalls::download::{download, DownloadOutcome};
use aa_pitfalls::tracing_setup::init_tracing;

fn main() -> Result<()> {
    let args = DownloadCli::parse();

    init_tracing(args.debug);

    match download(&args.url, &args.output, args.overwrite)? {
        DownloadOutcome::Kept => println!(
            "Keeping existing file {} (use --overwrite to replace it)",
            args.output.display()
        ),
        DownloadOutcome::Downloaded { bytes } => println!(
            "Downloaded sample dataset to {} ({} bytes)",
            args.output.display(),
            bytes
        ),
    }

    Ok(())
}
