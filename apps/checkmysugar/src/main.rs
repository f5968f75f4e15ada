//! CheckMySugar - Main Entry Point
//!
//! Trains the diabetes classifier and serves the prediction form.

use checkmysugar::cli::{Cli, Commands, cmd_serve, cmd_train};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    checkmysugar::logging::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Serve(args)) => cmd_serve(args).await,
        Some(Commands::Train(args)) => cmd_train(args).await,
        None => cmd_serve(&cli.serve).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "checkmysugar failed");
            ExitCode::FAILURE
        }
    }
}
