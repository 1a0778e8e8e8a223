//! Runtime context for CLI commands

use anyhow::{Context, Result};
use dbp_core::Config;
use dbp_db::Database;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Resolve the configuration: config file, then overrides, then validation.
pub fn load_config(args: &GlobalArgs) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        if config_path.is_dir() {
            Config::load_from_dir(config_path)
                .context("Failed to load configuration from directory")?
        } else {
            Config::load(config_path).context("Failed to load configuration file")?
        }
    } else {
        Config::discover(Path::new(".")).context("Failed to load configuration")?
    };
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Runtime context containing the resolved config and an open database
pub struct RuntimeContext {
    /// The resolved configuration
    pub config: Config,

    /// Database connection
    pub db: Box<dyn Database>,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let config = load_config(args)?;

        log::info!(
            "Starting: database {} ({}{}), patch dir {}, patch table '{}'",
            config.database.path,
            config.database.db_type,
            config
                .database
                .name
                .as_deref()
                .map(|n| format!(", using {n}"))
                .unwrap_or_default(),
            config.patch_dir.display(),
            config.ledger_table
        );

        let db = dbp_db::open(&config.database).context("Failed to open database")?;

        Ok(Self { config, db })
    }
}
