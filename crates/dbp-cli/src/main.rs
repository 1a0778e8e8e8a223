//! db-patch CLI - apply numbered SQL patch files to a database

use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::{apply, ls, status};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        None | Some(Commands::Apply) => {
            apply::execute(&cli.global).and_then(|summary| apply::report(&summary))
        }
        Some(Commands::Status(args)) => status::execute(args, &cli.global),
        Some(Commands::Ls(args)) => ls::execute(args, &cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
