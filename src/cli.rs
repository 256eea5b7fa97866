//! Command-line interface definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "cohort-tracker", version, about = "Study table curation CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the participant-by-visit availability tracker table
    Track(TrackArgs),
    /// Fetch files from a links list, skipping anything already present
    Fetch(FetchArgs),
}

#[derive(Debug, Args)]
pub struct TrackArgs {
    #[arg(long, help = "Path to the global config JSON file")]
    pub config: PathBuf,

    #[arg(
        long,
        default_value_t = false,
        help = "Write the tracker table (default is a dry run that only prints counts)"
    )]
    pub save: bool,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    #[arg(long, help = "File listing one download link per line")]
    pub links: PathBuf,

    #[arg(long, help = "Destination directory for fetched files")]
    pub dest: PathBuf,
}
