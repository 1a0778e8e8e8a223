//! Configuration types and parsing for dbpatch.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// File names searched by [`Config::discover`], in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["dbpatch.yml", "dbpatch.yaml"];

/// Runner configuration
///
/// Passed explicitly into the engine; nothing below the CLI reads the
/// process environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory scanned for `NNNN<name>.sql` patch files
    #[serde(default = "default_patch_dir")]
    pub patch_dir: PathBuf,

    /// Name of the single-row table holding the current patch number
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patch_dir: default_patch_dir(),
            ledger_table: default_ledger_table(),
            database: DatabaseConfig::default(),
        }
    }
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (DuckDB file or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Database or schema selected with `USE` after connecting
    #[serde(default)]
    pub name: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
            name: None,
        }
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

const DEFAULT_LEDGER_TABLE: &str = "patch";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_patch_dir() -> PathBuf {
    PathBuf::from("patches")
}

fn default_ledger_table() -> String {
    DEFAULT_LEDGER_TABLE.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for dbpatch.yml or dbpatch.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Like [`load_from_dir`](Self::load_from_dir), but falls back to the
    /// defaults when the directory has no config file.
    pub fn discover(dir: &Path) -> CoreResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => {
                log::debug!("No config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Validate the configuration
    ///
    /// Called by [`load`](Self::load); callers that apply overrides on top of
    /// a loaded config should call it again afterwards.
    pub fn validate(&self) -> CoreResult<()> {
        if self.patch_dir.as_os_str().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "patch_dir cannot be empty".to_string(),
            });
        }

        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        if !is_identifier(&self.ledger_table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "ledger_table '{}' must be a plain identifier ([A-Za-z_][A-Za-z0-9_]*)",
                    self.ledger_table
                ),
            });
        }

        if let Some(name) = &self.database.name {
            if !is_identifier(name) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "database.name '{}' must be a plain identifier ([A-Za-z_][A-Za-z0-9_]*)",
                        name
                    ),
                });
            }
        }

        Ok(())
    }
}

/// Ledger table and database names are spliced into SQL text.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
