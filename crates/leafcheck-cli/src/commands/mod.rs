//! CLI command definitions and handlers.

pub mod check;
pub mod classify;
pub mod crops;

use clap::{Parser, Subcommand};

/// Leafcheck - Crop leaf photo checks and disease classification
#[derive(Parser)]
#[command(name = "leafcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, thresholds, flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Check photos for lighting and focus problems
    Check(check::CheckArgs),
    /// Check photos, then diagnose leaf diseases
    Classify(classify::ClassifyArgs),
    /// List the supported crops
    Crops(crops::CropsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every photo passed.
    Success = 0,
    /// At least one photo raised a quality warning.
    IssuesFound = 1,
    /// The run failed, or a classification failed.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
