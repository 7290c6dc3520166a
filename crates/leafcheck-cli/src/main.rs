//! Leafcheck CLI - crop leaf photo checks and disease classification.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::check::CheckArgs;
use commands::classify::ClassifyArgs;
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = match cli.command {
        Some(Commands::Check(args)) => run_check(args).await,
        Some(Commands::Classify(args)) => {
            let args = ClassifyArgs::with_config(args, &AppConfig::load());
            match commands::classify::run(&args).await {
                Ok(summary) => summary.classify_exit_code(),
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::Error
                }
            }
        }
        Some(Commands::Crops(ref args)) => match commands::crops::run(args) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
        None => {
            // Default behavior: run check with flattened args
            if cli.check.paths.is_empty() {
                eprintln!("error: No paths specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            run_check(cli.check).await
        }
    };

    exit_code.into()
}

async fn run_check(args: CheckArgs) -> ExitCode {
    let args = CheckArgs::with_config(args, &AppConfig::load());
    match commands::check::run(&args).await {
        Ok(summary) => summary.check_exit_code(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}
