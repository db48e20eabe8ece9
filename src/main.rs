use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;

mod api;
mod cli;
mod commands;
mod domain;
mod error;
mod inventory;
mod services;

use cli::Cli;

fn main() -> ExitCode {
    services::logging::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // Inventory callers probe with other flags; those get an empty, successful answer.
            tracing::debug!(error = %e.kind(), "ignoring unsupported invocation");
            return ExitCode::SUCCESS;
        }
    };

    if !cli.list {
        return ExitCode::SUCCESS;
    }

    match commands::handle_list(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
