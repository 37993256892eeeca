use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sprep",
    about = "SOAP descriptor preparation for interatomic potential datasets",
    version,
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process the training set and compute normalization statistics
    #[command(visible_alias = "t")]
    Training(DatasetArgs),

    /// Process the prediction set (descriptors only)
    #[command(visible_alias = "p")]
    Prediction(DatasetArgs),

    /// Process both sets in one run
    #[command(visible_alias = "a")]
    All(DatasetArgs),
}

/// Options shared by all commands.
#[derive(Args)]
pub struct DatasetArgs {
    /// Dataset root holding the training/ and prediction/ subdirectories
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Cutoff radius of the SOAP descriptor (Å)
    #[arg(long, value_name = "Å", default_value = "6.0")]
    pub rcut: f64,

    /// Gaussian width of the atomic density (Å)
    #[arg(long, value_name = "Å", default_value = "1.0")]
    pub sigma: f64,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
