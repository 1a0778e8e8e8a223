//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use duckdb::Connection;
use std::path::Path;

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Connection,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self { conn })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Select the database or schema later statements run against
    pub fn use_database(&self, name: &str) -> DbResult<()> {
        self.conn
            .execute_batch(&format!("USE {}", quote_ident(name)))
            .map_err(|e| DbError::ConnectionError(format!("USE {name} failed: {e}")))
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Database for DuckDbBackend {
    fn execute(&self, sql: &str) -> DbResult<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        Ok(self.conn.execute_batch(sql)?)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        // DuckDB resolves unquoted identifiers case-insensitively
        let count: i64 = match name.rfind('.') {
            Some(pos) => self.conn.query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_catalog = current_database() \
                 AND lower(table_schema) = lower(?) AND lower(table_name) = lower(?)",
                duckdb::params![&name[..pos], &name[pos + 1..]],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_catalog = current_database() AND table_schema = current_schema() \
                 AND lower(table_name) = lower(?)",
                duckdb::params![name],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }

    fn query_integers(&self, sql: &str) -> DbResult<Vec<Option<i64>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, Option<i64>>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_backend_test.rs"]
mod tests;
