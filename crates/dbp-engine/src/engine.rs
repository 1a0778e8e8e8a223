//! The apply loop.
//!
//! One run reads the ledger (creating it on first use), scans the patch
//! directory, then applies `current + 1`, `current + 2`, ... until a number
//! has no file. The first failure ends the run; nothing is retried.

use crate::apply::apply_patch;
use crate::error::{PatchError, PatchResult};
use crate::ledger::Ledger;
use dbp_core::{catalog, Config, PatchFile, PatchNumber, PatchSet};
use dbp_db::Database;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// A patch applied during a run
#[derive(Debug, Clone, Serialize)]
pub struct AppliedPatch {
    pub number: PatchNumber,
    pub path: PathBuf,
    /// Statements executed
    pub statements: usize,
    /// Time from reading the file to advancing the ledger
    pub elapsed: Duration,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Ledger value when the run started (0 if it was just created)
    pub initial: PatchNumber,
    /// Ledger value when the run finished
    pub current: PatchNumber,
    /// Whether the ledger table was created by this run
    pub bootstrapped: bool,
    pub applied: Vec<AppliedPatch>,
}

/// What the next run would do, computed without writing anything
#[derive(Debug, Clone, Serialize)]
pub struct PatchPlan {
    /// Ledger value, or `None` when the table does not exist yet
    pub current: Option<PatchNumber>,
    /// Patches the next run would apply, in order
    pub pending: Vec<PatchFile>,
    /// Patch files numbered past a gap; never reached by the walk
    pub unreachable: Vec<PatchFile>,
    /// Total patch files found
    pub available: usize,
}

/// Applies pending patches to one database.
///
/// Assumes it is the only runner working against the ledger.
pub struct PatchEngine<'a> {
    db: &'a dyn Database,
    config: &'a Config,
}

impl<'a> PatchEngine<'a> {
    /// Create an engine over `db` configured by `config`.
    pub fn new(db: &'a dyn Database, config: &'a Config) -> Self {
        Self { db, config }
    }

    /// The ledger this engine reads and advances.
    pub fn ledger(&self) -> Ledger<'a> {
        let config: &'a Config = self.config;
        Ledger::new(self.db, &config.ledger_table)
    }

    /// Apply every pending patch.
    pub fn run(&self) -> PatchResult<RunSummary> {
        let ledger = self.ledger();

        let (initial, bootstrapped) = match ledger.current_patch() {
            Ok(number) => (number, false),
            Err(PatchError::LedgerMissing { table }) => {
                log::warn!("Patch table '{table}' does not exist");
                ledger.init()?;
                log::info!("Created patch table '{table}'");
                (PatchNumber::ZERO, true)
            }
            Err(e) => return Err(e),
        };
        log::info!("Found patch #{initial}");

        let patches = catalog::scan(&self.config.patch_dir);
        if patches.is_empty() {
            return Err(PatchError::NoPatchesFound {
                dir: self.config.patch_dir.clone(),
            });
        }
        check_duplicates(&patches, initial)?;

        let mut current = initial;
        let mut applied = Vec::new();
        for file in patches.walk_from(initial) {
            let patch = self.apply_one(&ledger, file)?;
            log::info!(
                "Applied patch #{} ({}) in {:?}",
                patch.number,
                patch.path.display(),
                patch.elapsed
            );
            current = patch.number;
            applied.push(patch);
        }

        let unreachable = patches.iter().filter(|f| f.number > current).count();
        if unreachable > 0 {
            log::warn!(
                "Stopped at patch #{current}: no file for #{} but {unreachable} higher-numbered patches exist",
                current.get().saturating_add(1)
            );
        }

        log::info!("Done at patch #{current} ({} applied)", applied.len());
        Ok(RunSummary {
            initial,
            current,
            bootstrapped,
            applied,
        })
    }

    fn apply_one(&self, ledger: &Ledger<'_>, file: &PatchFile) -> PatchResult<AppliedPatch> {
        let start = Instant::now();
        log::debug!("Applying patch #{} ({})", file.number, file.path.display());

        let sql = file.read_sql().map_err(|source| PatchError::PatchFileRead {
            number: file.number,
            path: file.path.clone(),
            source,
        })?;

        let statements = apply_patch(self.db, &sql).map_err(|source| PatchError::Apply {
            number: file.number,
            path: file.path.clone(),
            source,
        })?;

        if let Err(e) = ledger.advance(file.number) {
            log::error!(
                "Patch #{} ({}) is committed but patch table '{}' still records the previous patch; \
                 set it to {} by hand before rerunning",
                file.number,
                file.path.display(),
                ledger.table(),
                file.number
            );
            return Err(PatchError::LedgerAdvanceAfterApply {
                number: file.number,
                path: file.path.clone(),
                source: Box::new(e),
            });
        }

        Ok(AppliedPatch {
            number: file.number,
            path: file.path.clone(),
            statements,
            elapsed: start.elapsed(),
        })
    }

    /// Report the current patch and what the next run would apply.
    ///
    /// Read-only: a missing ledger is reported, not created.
    pub fn plan(&self) -> PatchResult<PatchPlan> {
        let current = match self.ledger().current_patch() {
            Ok(number) => Some(number),
            Err(PatchError::LedgerMissing { .. }) => None,
            Err(e) => return Err(e),
        };
        let version = current.unwrap_or(PatchNumber::ZERO);

        let patches = catalog::scan(&self.config.patch_dir);
        let pending: Vec<PatchFile> = patches.walk_from(version).cloned().collect();
        let last = pending.last().map_or(version, |f| f.number);
        let unreachable = patches.iter().filter(|f| f.number > last).cloned().collect();

        Ok(PatchPlan {
            current,
            pending,
            unreachable,
            available: patches.len(),
        })
    }
}

/// Refuse to run when a number still to be applied is claimed by more than
/// one file. Collisions at or below `version` are already history.
fn check_duplicates(patches: &PatchSet, version: PatchNumber) -> PatchResult<()> {
    let Some((number, others)) = patches.duplicates().iter().find(|(n, _)| **n > version) else {
        return Ok(());
    };
    let mut paths: Vec<PathBuf> = patches
        .get(*number)
        .map(|f| f.path.clone())
        .into_iter()
        .collect();
    paths.extend(others.iter().cloned());
    Err(PatchError::DuplicatePatch {
        number: *number,
        paths,
    })
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
