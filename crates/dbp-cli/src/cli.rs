//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use dbp_core::Config;
use std::path::PathBuf;

/// db-patch - apply numbered SQL patch files to a database, in order, once
#[derive(Parser, Debug)]
#[command(name = "db-patch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute (default: apply)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands
///
/// Each override falls back to an environment variable, then to the config
/// file, then to the built-in default.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: ./dbpatch.yml if present)
    #[arg(short, long, global = true, env = "DB_PATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory containing NNNN<name>.sql patch files
    #[arg(long, global = true, env = "PATCH_DIR")]
    pub patch_dir: Option<PathBuf>,

    /// Database file path (or :memory:)
    #[arg(long, global = true, env = "DB_PATH")]
    pub db_path: Option<String>,

    /// Database or schema to USE after connecting
    #[arg(long, global = true, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Name of the table recording the current patch number
    #[arg(long, global = true, env = "DB_PATCH_TABLE")]
    pub ledger_table: Option<String>,
}

impl GlobalArgs {
    /// Overlay command-line and environment values onto `config`.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.patch_dir {
            config.patch_dir = dir.clone();
        }
        if let Some(path) = &self.db_path {
            config.database.path = path.clone();
        }
        if let Some(name) = &self.db_name {
            config.database.name = Some(name.clone());
        }
        if let Some(table) = &self.ledger_table {
            config.ledger_table = table.clone();
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply every pending patch (the default)
    Apply,

    /// Show the current patch and what `apply` would run
    Status(StatusArgs),

    /// List the patch files found in the patch directory
    Ls(LsArgs),
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable summary
    Text,
    /// JSON output
    Json,
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
