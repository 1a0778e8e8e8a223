//! Database trait definition

use crate::error::DbResult;

/// Database abstraction trait for db-patch
///
/// Synchronous and single-owner: the engine borrows one connection for the
/// whole run and never shares it between threads.
pub trait Database {
    /// Execute one SQL statement, returns affected rows
    fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute SQL text that may hold several statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Check if a table or view exists in the current schema
    ///
    /// `name` may be schema-qualified (`schema.table`).
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Run a query and return the first column of every row as an integer
    fn query_integers(&self, sql: &str) -> DbResult<Vec<Option<i64>>>;

    /// Open a transaction
    fn begin(&self) -> DbResult<()> {
        self.execute_batch("BEGIN TRANSACTION")
    }

    /// Commit the open transaction
    fn commit(&self) -> DbResult<()> {
        self.execute_batch("COMMIT")
    }

    /// Roll back the open transaction
    fn rollback(&self) -> DbResult<()> {
        self.execute_batch("ROLLBACK")
    }

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
