//! dbp-db - Database abstraction layer for db-patch
//!
//! This crate provides the synchronous `Database` trait the patch engine
//! runs against, a DuckDB implementation, and [`open`], which turns a
//! [`DatabaseConfig`](dbp_core::DatabaseConfig) into a live connection.

pub mod duckdb_backend;
pub mod error;
pub mod traits;

pub use duckdb_backend::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;

use dbp_core::{DatabaseConfig, DbType};

/// Open a connection for `config`.
///
/// When `config.name` is set it is selected with `USE` before the connection
/// is handed out, so every later statement runs against that database.
pub fn open(config: &DatabaseConfig) -> DbResult<Box<dyn Database>> {
    match config.db_type {
        DbType::DuckDb => {
            let backend = DuckDbBackend::new(&config.path)?;
            if let Some(name) = &config.name {
                backend.use_database(name)?;
            }
            log::debug!("Opened {} database at {}", backend.db_type(), config.path);
            Ok(Box::new(backend))
        }
    }
}
