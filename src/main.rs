use anyhow::Context;
use clap::Parser;
use log::info;

use cohort_tracker::cli::{Cli, Commands, FetchArgs, TrackArgs};
use cohort_tracker::config::GlobalConfig;
use cohort_tracker::output::{SaveOutcome, save_with_backup};
use cohort_tracker::tracker::TrackerBuilder;
use cohort_tracker::transfer::{self, LocalDirTransport, TransferStatus};

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Track(args) => run_track(&args),
        Commands::Fetch(args) => run_fetch(&args),
    }
}

fn run_track(args: &TrackArgs) -> anyhow::Result<()> {
    let config = GlobalConfig::from_file(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;
    let destination = config.output_path();
    let backups = config.backups_path();

    let table = TrackerBuilder::run(config).context("building tracker table")?;
    println!("{}", table.summary);

    if args.save {
        match save_with_backup(&table.batch, &destination, &backups)? {
            SaveOutcome::Written(path) => info!("Tracker table written to {}", path.display()),
            SaveOutcome::Unchanged => {}
        }
    } else {
        info!("Dry run; pass --save to write the tracker table");
    }
    Ok(())
}

fn run_fetch(args: &FetchArgs) -> anyhow::Result<()> {
    let links = transfer::read_links_file(&args.links)
        .with_context(|| format!("reading links from {}", args.links.display()))?;
    let transport = LocalDirTransport::new(&args.dest);
    let results = transfer::fetch_missing(&links, &transport).context("running transfers")?;

    let transferred = results
        .iter()
        .filter(|r| r.status == TransferStatus::Transferred)
        .count();
    let skipped = results
        .iter()
        .filter(|r| r.status == TransferStatus::Skipped)
        .count();
    let failed = results.len() - transferred - skipped;
    println!("{transferred} transferred, {skipped} skipped, {failed} failed");

    if failed > 0 {
        anyhow::bail!("{failed} transfer(s) failed");
    }
    Ok(())
}
