//! dbp-core - Core library for db-patch
//!
//! This crate provides the strongly-typed patch number, discovery of patch
//! files on disk (the catalog), and configuration parsing shared by the
//! engine and the CLI.

pub mod catalog;
pub mod config;
pub mod error;
pub mod patch_number;

pub use catalog::{scan, try_scan, PatchFile, PatchSet};
pub use config::{Config, DatabaseConfig, DbType};
pub use error::{CoreError, CoreResult};
pub use patch_number::PatchNumber;
