//! The patch ledger: a single-row, single-column table holding the number of
//! the last patch applied.
//!
//! The table either does not exist (nothing has ever run) or holds exactly
//! one row. Only the engine writes to it, once per committed patch.

use crate::apply::apply_patch;
use crate::error::{PatchError, PatchResult};
use dbp_core::PatchNumber;
use dbp_db::{Database, DbError};

/// Read/write access to the ledger table.
pub struct Ledger<'a> {
    db: &'a dyn Database,
    table: &'a str,
}

impl<'a> Ledger<'a> {
    /// Wrap `db`, keeping the ledger in `table`.
    ///
    /// `table` is spliced into SQL text and must be a plain identifier;
    /// [`Config::validate`](dbp_core::Config::validate) enforces that.
    pub fn new(db: &'a dyn Database, table: &'a str) -> Self {
        Self { db, table }
    }

    /// Name of the ledger table.
    pub fn table(&self) -> &str {
        self.table
    }

    /// Return the current patch number.
    ///
    /// A missing table is reported as [`PatchError::LedgerMissing`] so the
    /// caller can bootstrap; anything else that prevents reading exactly one
    /// non-negative value is an error.
    pub fn current_patch(&self) -> PatchResult<PatchNumber> {
        let exists = self
            .db
            .relation_exists(self.table)
            .map_err(|source| self.read_error(source))?;
        if !exists {
            return Err(self.missing());
        }

        let values = match self
            .db
            .query_integers(&format!("SELECT CAST(patch AS BIGINT) FROM {}", self.table))
        {
            Ok(values) => values,
            Err(DbError::TableNotFound(_)) => return Err(self.missing()),
            Err(source) => return Err(self.read_error(source)),
        };

        match values.as_slice() {
            [Some(value)] => PatchNumber::try_from(*value)
                .map_err(|_| self.corrupt(format!("patch number {value} is out of range"))),
            [None] => Err(self.corrupt("patch number is NULL".to_string())),
            [] => Err(self.corrupt("table has no rows".to_string())),
            rows => Err(self.corrupt(format!("table has {} rows, expected 1", rows.len()))),
        }
    }

    /// Create the ledger table holding patch number 0.
    ///
    /// Runs as one transaction. Call it only after
    /// [`current_patch`](Self::current_patch) reported the table missing.
    pub fn init(&self) -> PatchResult<()> {
        let sql = format!(
            "CREATE TABLE {table} (patch INTEGER); INSERT INTO {table} (patch) VALUES (0);",
            table = self.table
        );
        apply_patch(self.db, &sql).map_err(|source| PatchError::LedgerInit {
            table: self.table.to_string(),
            source,
        })?;
        log::debug!("Created patch table '{}'", self.table);
        Ok(())
    }

    /// Set the ledger to `number`.
    ///
    /// Unconditional: there is no check against the previous value, so only
    /// one runner may work against a ledger at a time.
    pub fn advance(&self, number: PatchNumber) -> PatchResult<()> {
        let rows = self
            .db
            .execute(&format!("UPDATE {} SET patch = {}", self.table, number.get()))
            .map_err(|source| PatchError::LedgerWrite {
                table: self.table.to_string(),
                number,
                source,
            })?;
        if rows != 1 {
            return Err(PatchError::LedgerRowCount {
                table: self.table.to_string(),
                number,
                rows,
            });
        }
        Ok(())
    }

    fn missing(&self) -> PatchError {
        PatchError::LedgerMissing {
            table: self.table.to_string(),
        }
    }

    fn read_error(&self, source: DbError) -> PatchError {
        PatchError::LedgerRead {
            table: self.table.to_string(),
            source,
        }
    }

    fn corrupt(&self, reason: String) -> PatchError {
        PatchError::LedgerCorrupt {
            table: self.table.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
